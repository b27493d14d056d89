// Copyright (c) 2026 rezky_nightky

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::WrapErr;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn file_subscriber(file: File, level: LevelFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry().with(level).with(
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false),
    )
}

pub fn init(path: Option<&Path>, level: LevelFilter) -> color_eyre::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
    file_subscriber(file, level)
        .try_init()
        .wrap_err("a logger is already installed")?;
    Ok(())
}
