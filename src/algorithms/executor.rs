//! Bounded worker pool
//!
//! The executor runs the parallel phases of one generation: offspring
//! production and fitness evaluation. With a parallelism of 1 (or without
//! the `parallel` feature) everything runs on the calling thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{EvoResult, EvolutionError};
use crate::population::population::Population;

/// Runs independent tasks on a fixed number of workers
///
/// A pool is owned by a single `evolve` call and its threads are released
/// when the executor is dropped.
pub enum Executor {
    /// Run on the calling thread
    Sequential,
    /// Run on a dedicated rayon pool
    #[cfg(feature = "parallel")]
    Pool(ThreadPool),
}

impl Executor {
    /// Create an executor with `parallelism` workers
    pub fn new(parallelism: usize) -> EvoResult<Self> {
        if parallelism == 0 {
            return Err(EvolutionError::invalid_parameter(
                "parallelism must be at least 1",
            ));
        }
        #[cfg(feature = "parallel")]
        {
            if parallelism > 1 {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(parallelism)
                    .thread_name(|i| format!("evolve-worker-{i}"))
                    .build()
                    .map_err(|e| EvolutionError::WorkerPool(e.to_string()))?;
                return Ok(Self::Pool(pool));
            }
        }
        Ok(Self::Sequential)
    }

    /// Number of workers
    pub fn parallelism(&self) -> usize {
        match self {
            Self::Sequential => 1,
            #[cfg(feature = "parallel")]
            Self::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Run `tasks` independent tasks and collect their results in task order
    ///
    /// If any task fails, the whole batch fails with the error of the lowest
    /// failing task index.
    pub fn try_map<T, F>(&self, tasks: usize, task: F) -> EvoResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> EvoResult<T> + Sync + Send,
    {
        match self {
            Self::Sequential => (0..tasks).map(task).collect(),
            #[cfg(feature = "parallel")]
            Self::Pool(pool) => {
                let results: Vec<EvoResult<T>> =
                    pool.install(|| (0..tasks).into_par_iter().map(&task).collect());
                results.into_iter().collect()
            }
        }
    }

    /// Compute the fitness of every chromosome in the population
    pub fn evaluate<P>(&self, population: &Population<P>) {
        match self {
            Self::Sequential => population.evaluate(),
            #[cfg(feature = "parallel")]
            Self::Pool(pool) => pool.install(|| population.evaluate_parallel()),
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("parallelism", &self.parallelism())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_rejects_zero_parallelism() {
        assert!(matches!(
            Executor::new(0),
            Err(EvolutionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_sequential_executor() {
        let executor = Executor::new(1).unwrap();
        assert_eq!(executor.parallelism(), 1);
        let squares = executor.try_map(5, |i| Ok(i * i)).unwrap();
        assert_eq!(squares, vec![0, 1, 4, 9, 16]);
    }

    #[test]
    fn test_results_in_task_order() {
        let executor = Executor::new(4).unwrap();
        let values = executor.try_map(100, |i| Ok(i)).unwrap();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_pool_size() {
        let executor = Executor::new(3).unwrap();
        assert_eq!(executor.parallelism(), 3);
    }

    #[test]
    fn test_first_error_in_task_order() {
        let executor = Executor::new(4).unwrap();
        let result: EvoResult<Vec<usize>> = executor.try_map(50, |i| {
            if i % 7 == 6 {
                Err(EvolutionError::InvalidParameter(format!("task {i}")))
            } else {
                Ok(i)
            }
        });
        assert_eq!(
            result.unwrap_err(),
            EvolutionError::InvalidParameter("task 6".to_string())
        );
    }
}
