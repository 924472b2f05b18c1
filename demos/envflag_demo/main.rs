//! # envflag demo application
//!
//! A sample CLI tool that resolves its configuration through
//! [envflag](https://docs.rs/envflag). It exists to demonstrate and manually
//! verify envflag's behavior, not to do anything useful.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example envflag_demo
//! cargo run --example envflag_demo -- -h
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                  | How to exercise it                                                 |
//! |--------------------------|--------------------------------------------------------------------|
//! | Zero defaults            | `cargo run --example envflag_demo`                                 |
//! | Env var seeding          | `PORT=8080 cargo run --example envflag_demo`                       |
//! | Named nesting            | `SERVER_HOST=db cargo run --example envflag_demo`                  |
//! | Flag override            | `PORT=8080 cargo run --example envflag_demo -- -PORT 9090`         |
//! | Display-name flag        | `cargo run --example envflag_demo -- -maxConnections 0x40`         |
//! | Durations                | `cargo run --example envflag_demo -- -SERVER_TIMEOUT 1m30s`        |
//! | Sequences                | `TAGS=a,b,c cargo run --example envflag_demo`                      |
//! | Custom decoding          | `cargo run --example envflag_demo -- -COLOR cyan`                  |
//! | Positional arguments     | `cargo run --example envflag_demo -- -v serve extra`               |
//! | Malformed env value      | `RUST_LOG=warn PORT=http cargo run --example envflag_demo`         |
//! | Usage text               | `cargo run --example envflag_demo -- -h`                           |

mod config;

use envflag::{Binder, EnvflagError};
use tracing_subscriber::EnvFilter;

use config::DemoConfig;

const RESET: &str = "\x1b[0m";

fn echo(config: &DemoConfig, positional: &[String]) {
    let color = config.display.color.ansi();

    if config.verbose {
        println!("{color}[verbose] Resolved configuration for {:?}{RESET}", config.name);
        println!();
    }

    let entries = [
        ("name", config.name.clone()),
        ("verbose", config.verbose.to_string()),
        ("server.host", config.server.host.clone()),
        ("server.port", config.server.port.to_string()),
        ("server.max_connections", config.server.max_connections.to_string()),
        ("server.timeout", format!("{:?}", config.server.timeout)),
        ("display.color", format!("{:?}", config.display.color)),
        ("display.tags", config.display.tags.join(",")),
        ("args", positional.join(" ")),
    ];

    let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in &entries {
        println!("{color}{key:<max_key_len$}{RESET}  {value}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = DemoConfig::default();
    let result = Binder::new()
        .name("envflag-demo")
        .bind(std::env::args().skip(1), &mut config);

    match result {
        Ok(flags) => echo(&config, flags.args()),
        Err(EnvflagError::Help(usage)) => println!("{usage}"),
        Err(e) => {
            eprintln!("Failed to resolve configuration:\n{e}");
            std::process::exit(1);
        }
    }
}
