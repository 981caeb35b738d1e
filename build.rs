//! Build script rendering the `bitframe(1)` manual page from the CLI
//! definition, stamped with the package version.

use std::{fs, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from("target/generated-man");
    fs::create_dir_all(&out_dir)?;

    let cmd = cli::Cli::command();
    let man = Man::new(cmd)
        .source(format!("bitframe {}", env!("CARGO_PKG_VERSION")))
        .manual("bitframe manual");
    let mut buf: Vec<u8> = Vec::new();
    man.render(&mut buf)?;
    fs::write(out_dir.join("bitframe.1"), buf)?;

    Ok(())
}
