//! Configuration structs for the envflag demo application.
//!
//! [`DemoConfig`] nests two records to show both naming modes: `server` is a
//! named field, so its keys are prefixed; `display` is flattened, so its keys
//! are not.
//!
//! | Field                    | Env var           | Flag               |
//! |--------------------------|-------------------|--------------------|
//! | `name`                   | `NAME`            | `-NAME`            |
//! | `verbose`                | `V`               | `-v`               |
//! | `server.host`            | `SERVER_HOST`     | `-SERVER_HOST`     |
//! | `server.port`            | `PORT`            | `-PORT`            |
//! | `server.max_connections` | `MAXCONNECTIONS`  | `-maxConnections`  |
//! | `server.timeout`         | `SERVER_TIMEOUT`  | `-SERVER_TIMEOUT`  |
//! | `display.color`          | `COLOR`           | `-COLOR`           |
//! | `display.tags`           | `TAGS`            | `-TAGS`            |

use std::time::Duration;

use envflag::{BoxError, Decode, Schema};

/// Root configuration for the demo application.
#[derive(Debug, Default, Schema)]
pub struct DemoConfig {
    #[envflag(help = "Application name shown in the banner")]
    pub name: String,

    #[envflag(flag = "v", help = "Enable verbose output")]
    pub verbose: bool,

    pub server: ServerConfig,

    #[envflag(flatten)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Schema)]
pub struct ServerConfig {
    pub host: String,

    #[envflag(env = "port")]
    pub port: u16,

    #[envflag(json = "maxConnections")]
    pub max_connections: u32,

    pub timeout: Duration,
}

#[derive(Debug, Default, Schema)]
pub struct DisplayConfig {
    #[envflag(decode, help = "red, green, yellow, blue, magenta or cyan")]
    pub color: Color,

    pub tags: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum Color {
    Red,
    Green,
    #[default]
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl Color {
    pub fn ansi(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
            Color::Magenta => "\x1b[35m",
            Color::Cyan => "\x1b[36m",
        }
    }
}

impl Decode for Color {
    fn set(&mut self, text: &str) -> Option<Result<(), BoxError>> {
        let color = match text {
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            other => return Some(Err(format!("unknown color {other:?}").into())),
        };
        *self = color;
        Some(Ok(()))
    }

    fn to_text(&self) -> String {
        format!("{self:?}").to_lowercase()
    }
}
