#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Binary entry point for the neighborhood analysis API server.
//!
//! Pass `--interactive` to be prompted for settings; otherwise they are
//! read from the environment.

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    if std::env::args().skip(1).any(|a| a == "--interactive" || a == "-i") {
        realty_server::interactive::run().await?;
    } else {
        realty_server::run_server().await?;
    }

    Ok(())
}
