/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod config;
mod control;
mod probe;
mod tcp;

use crate::config::Config;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use stream_router::{
    spawn_ingress, spawn_recompute_timer, BindError, FrameSink, InputConfig, InputId, NoProbe,
    Router, RouterConfig, RouterState, SignalProbe, StateObserver,
};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stream-routerd", about = "Failover stream router daemon")]
struct RouterdArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

/// Mirrors every state transition into the daemon log.
struct LoggingObserver;

impl StateObserver for LoggingObserver {
    fn on_state(&self, state: &RouterState) {
        info!(component = "daemon", state = %state, "router state");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = RouterdArgs::parse();
    let contents = std::fs::read_to_string(&args.config)?;
    let config: Config = json5::from_str(&contents)?;

    let quality_tracking = config
        .inputs
        .iter()
        .any(|input| input.signal_threshold.is_some());
    let signal_probe: Arc<dyn SignalProbe> = if quality_tracking {
        Arc::new(probe::PeakLevelProbe)
    } else {
        Arc::new(NoProbe)
    };

    let router_config = RouterConfig {
        inputs: config
            .inputs
            .iter()
            .map(|input| {
                let mut input_config = InputConfig::new(
                    InputId::new(&input.id),
                    Duration::from_millis(input.failover_window_ms),
                );
                if let Some(threshold) = input.signal_threshold {
                    input_config = input_config.with_signal_threshold(threshold);
                }
                input_config
            })
            .collect(),
        egress_queue_size: config.router.egress_queue_size,
    };
    let router = Arc::new(Router::new("stream-routerd", router_config, signal_probe)?);
    router.register_observer(Arc::new(LoggingObserver)).await;

    // A sink that cannot connect yet is not fatal; it keeps retrying on send.
    let mut sinks = Vec::new();
    for output in &config.outputs {
        let sink = tcp::TcpFrameSink::new(
            &output.connect,
            Duration::from_millis(output.reconnect_backoff_ms),
        );
        sink.connect().await;
        router.add_sink(sink.clone()).await;
        sinks.push(sink);
    }

    // Every input endpoint is bound before any traffic flows; a failed bind
    // aborts startup with a non-zero exit.
    let mut sources = Vec::new();
    for input in &config.inputs {
        let source = tcp::TcpFrameSource::bind(
            InputId::new(&input.id),
            &input.listen,
            config.router.max_frame_size,
        )
        .await?;
        sources.push(source);
    }

    let control_listener = tokio::net::TcpListener::bind(&config.control.listen)
        .await
        .map_err(|source| BindError {
            addr: config.control.listen.clone(),
            source,
        })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::new();
    for source in sources {
        tasks.push(spawn_ingress(
            router.clone(),
            Box::new(source),
            shutdown_rx.clone(),
        ));
    }
    tasks.push(spawn_recompute_timer(
        router.clone(),
        Duration::from_millis(config.router.recompute_interval_ms),
        shutdown_rx.clone(),
    ));
    tasks.push(control::spawn_control(
        router.clone(),
        control_listener,
        shutdown_rx.clone(),
    ));

    info!(component = "daemon", "stream-routerd running");
    tokio::signal::ctrl_c().await?;
    info!(component = "daemon", "shutdown requested");

    // Stop every task before tearing transports down so no late callback
    // observes a half-closed router.
    let _ = shutdown_tx.send(true);
    for task in tasks {
        let _ = task.await;
    }
    router.shutdown().await;
    for sink in sinks {
        sink.disconnect().await;
    }

    Ok(())
}
