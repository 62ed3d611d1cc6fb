#![deny(unused_must_use)]

use std::{env, path::PathBuf};

use xshell::cmd;

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(|s| &**s).collect::<Vec<_>>();

    match &args[..] {
        ["ci"] => test_ci(),
        ["test"] => test_device(),
        ["check"] => check_no_std(),
        _ => {
            println!("USAGE cargo xtask [ci|test|check]");
            Ok(())
        }
    }
}

fn test_ci() -> Result<(), anyhow::Error> {
    let _e = xshell::pushenv("CI", "true");
    test_device()?;
    check_no_std()?;
    Ok(())
}

fn test_device() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(device_dir())?;
    cmd!("cargo test --all").run()?;
    Ok(())
}

/// The library must keep building without `std` for every logging flavour.
fn check_no_std() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(device_dir())?;
    cmd!("cargo check --no-default-features").run()?;
    cmd!("cargo check --no-default-features --features log").run()?;
    cmd!("cargo check --no-default-features --features defmt").run()?;
    Ok(())
}

fn device_dir() -> PathBuf {
    let mut dir = root_dir();
    dir.push("device");
    dir
}

fn root_dir() -> PathBuf {
    let mut xtask_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    xtask_dir.pop();
    xtask_dir
}
