// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use roster_app::{Completion, Effect, perform};
use roster_remote::HttpGateway;
use roster_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Runs every effect against the remote store on its own thread so the event
/// loop keeps drawing while requests are in flight.
pub struct RemoteRuntime {
    gateway: HttpGateway,
}

impl RemoteRuntime {
    pub fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }
}

impl roster_tui::AppRuntime for RemoteRuntime {
    fn perform(&mut self, effect: &Effect) -> Completion {
        perform(&self.gateway, effect)
    }

    fn spawn_effect(&mut self, effect: Effect, tx: Sender<InternalEvent>) -> Result<()> {
        let gateway = self.gateway.clone();
        let ticket = effect.ticket().get();
        thread::Builder::new()
            .name(format!("roster-request-{ticket}"))
            .spawn(move || {
                let completion = perform(&gateway, &effect);
                if tx.send(InternalEvent::Completed(completion)).is_err() {
                    debug!(ticket, "event loop gone before request finished");
                }
            })
            .context("spawn request thread")?;
        Ok(())
    }
}
