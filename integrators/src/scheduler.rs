//! Render Scheduler

use lumen_core::film::*;
use lumen_core::math::*;
use lumen_core::parallel::*;
use lumen_core::paramset::*;
use lumen_core::rng::*;
use lumen_core::scene::*;
use std::time::Duration;

/// Per-thread state of a render loop.
struct RenderContext {
    rng: Random,
    film: Box<dyn Film>,
}

/// Drives a per-sample closure over the worker pool. Each thread renders into
/// its own film with its own RNG; the films are merged in thread order and
/// normalized by the number of processed samples.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderScheduler {
    /// Number of samples when `render_time` is negative.
    pub num_samples: u64,

    /// Render time in seconds; negative to render `num_samples` samples.
    pub render_time: Float,

    /// Samples a worker takes at once in time bounded mode.
    pub grain_size: u64,

    /// Thread count override; `None` uses the pool's setting.
    pub num_threads: Option<i32>,

    /// Samples between progress reports.
    pub progress_update_interval: u64,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self {
            num_samples: 10_000_000,
            render_time: -1.0,
            grain_size: 10_000,
            num_threads: None,
            progress_update_interval: 100_000,
        }
    }
}

impl RenderScheduler {
    /// Load `num_samples`, `render_time`, `grain_size`, `num_threads` and
    /// `progress_update_interval`.
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Result<Self, String> {
        let defaults = Self::default();

        let num_samples = params.find_one_number("num_samples", defaults.num_samples as Float);
        if !(num_samples >= 0.0) {
            return Err(format!("Invalid num_samples {}", num_samples));
        }
        let grain_size = params.find_one_int("grain_size", defaults.grain_size as Int);
        if grain_size <= 0 {
            return Err(format!("Invalid grain_size {}", grain_size));
        }
        let progress_update_interval =
            params.find_one_int("progress_update_interval", defaults.progress_update_interval as Int);
        if progress_update_interval <= 0 {
            return Err(format!("Invalid progress_update_interval {}", progress_update_interval));
        }

        let render_time = params.find_one_number("render_time", defaults.render_time);
        if !render_time.is_finite()
            || (render_time >= 0.0 && Duration::try_from_secs_f64(render_time as f64).is_err())
        {
            return Err(format!("Invalid render_time {}", render_time));
        }

        let scheduler = Self {
            num_samples: num_samples as u64,
            render_time,
            grain_size: grain_size as u64,
            num_threads: params.find_int("num_threads").first().copied(),
            progress_update_interval: progress_update_interval as u64,
        };

        info!("Loaded parameters");
        info!("  num_threads              = {:?}", scheduler.num_threads);
        info!("  grain_size               = {}", scheduler.grain_size);
        info!("  progress_update_interval = {}", scheduler.progress_update_interval);
        info!("  num_samples              = {}", scheduler.num_samples);
        info!("  render_time              = {}", scheduler.render_time);

        Ok(scheduler)
    }

    /// Returns the loop parameters.
    pub fn parallel_params(&self) -> ParallelForParams {
        if self.render_time < 0.0 {
            ParallelForParams::samples(self.num_samples)
        } else {
            ParallelForParams::time(Duration::from_secs_f64(self.render_time as f64), self.grain_size)
        }
    }

    /// Render into `film` and return the number of processed samples. The
    /// film is overwritten with the merged result scaled by
    /// `width * height / processed`.
    ///
    /// * `parallel` - Worker pool.
    /// * `scene`    - The scene.
    /// * `film`     - Output film.
    /// * `init_rng` - Source of the per-thread seeds.
    /// * `f`        - Renders one sample into a thread-local film.
    pub fn process<F>(
        &self,
        parallel: &Parallel,
        scene: &Scene,
        film: &mut dyn Film,
        init_rng: &mut Random,
        f: F,
    ) -> Result<u64, String>
    where
        F: Fn(&Scene, &mut dyn Film, &mut Random) + Sync,
    {
        let mut parallel = parallel.clone();
        if let Some(n) = self.num_threads {
            parallel.set_num_threads(n);
        }
        parallel.set_progress_update_interval(self.progress_update_interval);

        let (contexts, processed) = parallel.for_each_with(
            &self.parallel_params(),
            |_| RenderContext {
                rng: Random::new(init_rng.next_u32()),
                film: film.clone_empty(),
            },
            |ctx: &mut RenderContext, _index, _thread_id, _init| f(scene, ctx.film.as_mut(), &mut ctx.rng),
        );
        info!("# of samples: {}", processed);

        // Gather film data.
        film.clear();
        for ctx in &contexts {
            film.accumulate(ctx.film.as_ref())?;
        }
        if processed > 0 {
            film.rescale((film.width() * film.height()) as Float / processed as Float);
        }

        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_params_missing() {
        let s = RenderScheduler::from_params(&ParamSet::new()).unwrap();
        assert_eq!(s, RenderScheduler::default());
        assert_eq!(s.parallel_params().mode, ParallelMode::Samples);
    }

    #[test]
    fn render_time_selects_time_mode() {
        let mut params = ParamSet::new();
        params.add_from_str("render_time=1.5").unwrap();
        params.add_from_str("num_threads=3").unwrap();
        let s = RenderScheduler::from_params(&params).unwrap();
        assert_eq!(s.num_threads, Some(3));
        let p = s.parallel_params();
        assert_eq!(p.mode, ParallelMode::Time);
        assert_eq!(p.duration, Duration::from_millis(1500));
    }

    #[test]
    fn rejects_bad_values() {
        let mut params = ParamSet::new();
        params.add_from_str("grain_size=0").unwrap();
        assert!(RenderScheduler::from_params(&params).is_err());
        params.clear();
        params.add_from_str("num_samples=-5").unwrap();
        assert!(RenderScheduler::from_params(&params).is_err());
        for render_time in ["inf", "-inf", "NaN", "1e30"] {
            params.clear();
            params.add_from_str(&format!("render_time={}", render_time)).unwrap();
            assert!(RenderScheduler::from_params(&params).is_err(), "render_time={}", render_time);
        }
    }
}
