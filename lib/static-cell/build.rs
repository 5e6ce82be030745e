// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::env;

fn main() {
    println!("cargo:rustc-check-cfg=cfg(armv6m)");
    let target = env::var("TARGET").unwrap();
    if target.starts_with("thumbv6m") {
        println!("cargo:rustc-cfg=armv6m");
    }
    println!("cargo:rerun-if-env-changed=TARGET");
}
