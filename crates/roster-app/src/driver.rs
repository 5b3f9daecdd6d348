// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;

use crate::{Effect, RecordGateway, TableController, TableIntent, perform};

/// Performs effects in issue order, feeding each completion back into the
/// controller until nothing is left in flight. Returns how many requests ran.
pub fn settle<G: RecordGateway + ?Sized>(
    controller: &mut TableController,
    gateway: &G,
    effects: Vec<Effect>,
) -> usize {
    let mut queue: VecDeque<Effect> = effects.into();
    let mut performed = 0;
    while let Some(effect) = queue.pop_front() {
        let completion = perform(gateway, &effect);
        performed += 1;
        queue.extend(controller.resolve(completion));
    }
    performed
}

pub fn dispatch_and_settle<G: RecordGateway + ?Sized>(
    controller: &mut TableController,
    gateway: &G,
    intent: TableIntent,
) -> usize {
    let effects = controller.dispatch(intent);
    settle(controller, gateway, effects)
}
