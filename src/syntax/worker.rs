// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Parallel coloring of independent partitions.

use std::num::NonZeroUsize;
use std::thread;

use crossbeam_channel::unbounded;

use crate::syntax::document::Document;
use crate::syntax::partition::Partition;
use crate::syntax::registry::PartitionRegistry;
use crate::syntax::token::Token;

/// Returns the number of workers to use when the caller does not say.
pub fn default_worker_count() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Colors `partitions` of `doc` on `workers` scoped threads.
///
/// The result holds one token list per partition, in the order of
/// `partitions`. With one worker or one partition everything runs on the
/// calling thread.
#[tracing::instrument(level = "debug", skip_all, fields(partitions = partitions.len(), workers = workers))]
pub fn tokenize_parallel(
    registry: &PartitionRegistry,
    doc: &(dyn Document + Sync),
    partitions: &[Partition],
    workers: usize,
) -> Vec<Vec<Token>> {
    let workers = workers.clamp(1, partitions.len().max(1));
    if workers == 1 {
        return partitions.iter().map(|p| registry.tokenize(doc, p)).collect();
    }

    let (job_tx, job_rx) = unbounded::<(usize, Partition)>();
    let (result_tx, result_rx) = unbounded::<(usize, Vec<Token>)>();

    thread::scope(|s| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            s.spawn(move || {
                for (index, partition) in job_rx {
                    if result_tx.send((index, registry.tokenize(doc, &partition))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);

        for job in partitions.iter().copied().enumerate() {
            if job_tx.send(job).is_err() {
                tracing::debug!("all workers exited early");
                break;
            }
        }
        drop(job_tx);
    });
    drop(result_tx);

    let mut results = vec![Vec::new(); partitions.len()];
    for (index, tokens) in result_rx {
        results[index] = tokens;
    }
    results
}
