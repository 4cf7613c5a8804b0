use std::{sync::Arc, time::Duration};

use directions::RouteSource;
use futures::future::join_all;
use scheduler::SchedulingDefaults;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::{worker, TaskStore};

#[derive(Debug, Clone, Copy)]
pub struct DispatcherSettings {
    /// pause between polls of the queue
    pub interval: Duration,
    /// maximum tasks claimed per tick
    pub batch_size: usize,
    /// parallel workers per tick
    pub workers: usize,
}

/// Single polling loop over the task queue. Each tick sweeps expired rows,
/// reclaims abandoned ones, claims a batch and fans it out to a bounded
/// worker pool. The loop awaits the whole batch before sleeping again, so
/// ticks never overlap and the claim rate cannot outrun the workers.
pub struct Dispatcher {
    store: TaskStore,
    directions: Arc<dyn RouteSource>,
    defaults: SchedulingDefaults,
    settings: DispatcherSettings,
    slots: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(
        store: TaskStore,
        directions: Arc<dyn RouteSource>,
        defaults: SchedulingDefaults,
        settings: DispatcherSettings,
    ) -> Self {
        let slots = Arc::new(Semaphore::new(settings.workers.max(1)));
        Self {
            store,
            directions,
            defaults,
            settings,
            slots,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.settings.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }

    async fn tick(&self) {
        match self.store.sweep_expired().await {
            Ok(0) => {}
            Ok(evicted) => log::debug!("evicted {} expired tasks", evicted),
            Err(why) => log::warn!("task eviction sweep failed: {}", why),
        }
        match self.store.reclaim_stale().await {
            Ok(0) => {}
            Ok(reclaimed) => log::warn!("requeued {} abandoned tasks", reclaimed),
            Err(why) => log::warn!("stale task reclaim failed: {}", why),
        }

        let ids = match self.store.claim_batch(self.settings.batch_size).await {
            Ok(ids) => ids,
            Err(why) => {
                log::error!("task claim failed: {}", why);
                return;
            }
        };
        if ids.is_empty() {
            return;
        }
        log::info!("claimed {} scheduling tasks", ids.len());

        let mut workers = Vec::with_capacity(ids.len());
        for id in ids {
            let permit = match self.slots.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let store = self.store.clone();
            let directions = self.directions.clone();
            let defaults = self.defaults;
            workers.push(tokio::spawn(async move {
                let _permit = permit;
                (
                    id,
                    worker::process(&store, directions.as_ref(), &defaults, id).await,
                )
            }));
        }

        for outcome in join_all(workers).await {
            match outcome {
                Ok((id, Ok(()))) => log::info!("task row {} completed", id),
                Ok((id, Err(why))) => log::error!("task row {} failed: {}", id, why),
                Err(why) => log::error!("worker paniced: {}", why),
            }
        }
    }
}
