// Copyright 2025 The MakerRepo Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{collections::BTreeMap, sync::Mutex as StdMutex};

use futures_core::Future;
use tokio::sync::watch;

use crate::{Error, Result};

/// The outcome of an in-flight call: `None` while it runs, then the value,
/// or `Err(())` if it failed.
type Outcome<T> = Option<Result<T, ()>>;

type InflightMap<Key, T> = StdMutex<BTreeMap<Key, watch::Receiver<Outcome<T>>>>;

/// Handler that deduplicates concurrent calls given a key uniquely
/// identifying the call kind.
///
/// The first caller runs the call; everyone arriving while it is in flight
/// waits for it and gets a clone of its value. If the call failed, the
/// waiting callers get [`Error::ConcurrentRequestFailed`]. If the running
/// caller is dropped before the call finished, one of the waiting callers
/// runs its own call instead.
pub(crate) struct DeduplicatingHandler<Key, T> {
    inflight: InflightMap<Key, T>,
}

impl<Key, T> Default for DeduplicatingHandler<Key, T> {
    fn default() -> Self {
        Self { inflight: Default::default() }
    }
}

enum Slot<T> {
    Run(watch::Sender<Outcome<T>>),
    Wait(watch::Receiver<Outcome<T>>),
}

/// Removes the in-flight entry of a call however the call ends.
struct InflightEntry<'a, Key: Ord, T> {
    inflight: &'a InflightMap<Key, T>,
    key: Key,
}

impl<Key: Ord, T> Drop for InflightEntry<'_, Key, T> {
    fn drop(&mut self) {
        if let Ok(mut map) = self.inflight.lock() {
            map.remove(&self.key);
        }
    }
}

impl<Key: Clone + Ord, T: Clone> DeduplicatingHandler<Key, T> {
    pub async fn run<F: Future<Output = Result<T>>>(&self, key: Key, code: F) -> Result<T> {
        loop {
            let slot = {
                let mut map = self.inflight.lock().unwrap();

                if let Some(receiver) = map.get(&key) {
                    Slot::Wait(receiver.clone())
                } else {
                    let (sender, receiver) = watch::channel(None);
                    map.insert(key.clone(), receiver);
                    Slot::Run(sender)
                }
            };

            match slot {
                Slot::Run(sender) => {
                    // Dropped before `sender`, so waiters woken by a cancelled
                    // call don't find its entry anymore.
                    let _entry = InflightEntry { inflight: &self.inflight, key };

                    let result = code.await;
                    sender.send_replace(Some(result.as_ref().map(Clone::clone).map_err(|_| ())));

                    return result;
                }

                Slot::Wait(mut receiver) => {
                    // An error means the running call was dropped without an
                    // outcome; try again.
                    if let Ok(outcome) = receiver.wait_for(Option::is_some).await {
                        return match &*outcome {
                            Some(Ok(value)) => Ok(value.clone()),
                            _ => Err(Error::ConcurrentRequestFailed),
                        };
                    }
                }
            }
        }
    }
}
