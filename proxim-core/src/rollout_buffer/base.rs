//! Fixed-capacity rollout buffer with GAE-λ advantage estimation.
use super::{BatchBase, EpochBatch, RolloutBufferConfig, Transition};
use crate::{error::ProximError, ExperienceBufferBase, RolloutBufferBase};
use anyhow::Result;
use log::trace;

/// Stores one epoch of on-policy transitions and computes per-episode
/// discounted returns and GAE-λ advantages.
///
/// Transitions are appended in time order with `push`. Episodes packed
/// into the buffer are closed with `finish_path`, which runs the reverse
/// discounted scans over the slice `[path_start, ptr)` of the current
/// episode; rewards never propagate across an episode boundary. Once the
/// buffer is full, `take_epoch` normalizes the advantages across the whole
/// epoch and hands out the five index-aligned parts.
pub struct RolloutBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    capacity: usize,
    gamma: f32,
    lam: f32,

    // Write cursor and start index of the open episode.
    // Invariant: path_start <= ptr <= capacity.
    ptr: usize,
    path_start: usize,

    obs: O,
    act: A,
    reward: Vec<f32>,
    value: Vec<f32>,
    logp: Vec<f32>,

    // Derived, filled in by finish_path.
    adv: Vec<f32>,
    ret: Vec<f32>,
}

impl<O, A> ExperienceBufferBase for RolloutBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = Transition<O, A>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        if self.ptr == self.capacity {
            return Err(ProximError::BufferFull {
                capacity: self.capacity,
            }
            .into());
        }

        self.obs.push(self.ptr, tr.obs);
        self.act.push(self.ptr, tr.act);
        self.reward[self.ptr] = tr.reward;
        self.value[self.ptr] = tr.value;
        self.logp[self.ptr] = tr.logp;
        self.ptr += 1;

        Ok(())
    }

    fn len(&self) -> usize {
        self.ptr
    }
}

impl<O, A> RolloutBufferBase for RolloutBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Config = RolloutBufferConfig;
    type Epoch = EpochBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity;
        Self {
            capacity,
            gamma: config.gamma,
            lam: config.lam,
            ptr: 0,
            path_start: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            reward: vec![0.0; capacity],
            value: vec![0.0; capacity],
            logp: vec![0.0; capacity],
            adv: vec![0.0; capacity],
            ret: vec![0.0; capacity],
        }
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    /// Closes the episode `[path_start, ptr)`.
    ///
    /// Computes TD residuals against the value estimates, with `last_value`
    /// as the bootstrap value of the state after the last stored step,
    /// then fills in advantages (reverse scan with discount `gamma * lam`)
    /// and returns-to-go (reverse scan with discount `gamma`, bootstrapped
    /// with `last_value`).
    fn finish_path(&mut self, last_value: f32) {
        let mut next_value = last_value;
        let mut next_ret = last_value;
        let mut next_adv = 0f32;

        for t in (self.path_start..self.ptr).rev() {
            let delta = self.reward[t] + self.gamma * next_value - self.value[t];
            next_adv = delta + self.gamma * self.lam * next_adv;
            next_ret = self.reward[t] + self.gamma * next_ret;
            self.adv[t] = next_adv;
            self.ret[t] = next_ret;
            next_value = self.value[t];
        }

        trace!(
            "finish_path: [{}, {}), last_value = {}",
            self.path_start,
            self.ptr,
            last_value
        );
        self.path_start = self.ptr;
    }

    /// Takes the collected epoch out of the buffer.
    ///
    /// Advantages are normalized to zero mean and unit standard deviation
    /// across the whole epoch, so the scale of the policy-gradient
    /// estimator does not depend on how episodes happened to be packed.
    /// Both cursors are reset; the stored values are overwritten by the
    /// next epoch rather than cleared.
    fn take_epoch(&mut self) -> Result<Self::Epoch> {
        if self.ptr != self.capacity {
            return Err(ProximError::BufferNotFull {
                len: self.ptr,
                capacity: self.capacity,
            }
            .into());
        }
        debug_assert_eq!(self.path_start, self.ptr);

        let n = self.capacity as f32;
        let mean = self.adv.iter().sum::<f32>() / n;
        let std = (self.adv.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n).sqrt();
        let adv: Vec<f32> = self.adv.iter().map(|a| (a - mean) / (std + 1e-8)).collect();

        if !adv.iter().all(|v| v.is_finite()) || !self.ret.iter().all(|v| v.is_finite()) {
            return Err(ProximError::NumericInstability("advantage estimation".into()).into());
        }

        let ixs = (0..self.capacity).collect::<Vec<_>>();
        let epoch = EpochBatch {
            obs: self.obs.sample(&ixs),
            act: self.act.sample(&ixs),
            adv,
            ret: self.ret.clone(),
            logp: self.logp.clone(),
        };

        self.ptr = 0;
        self.path_start = 0;

        Ok(epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProximError;

    impl BatchBase for Vec<f32> {
        fn new(capacity: usize) -> Self {
            vec![0.0; capacity]
        }

        fn push(&mut self, ix: usize, data: Self) {
            for (i, v) in data.iter().enumerate() {
                self[ix + i] = *v;
            }
        }

        fn sample(&self, ixs: &Vec<usize>) -> Self {
            ixs.iter().map(|ix| self[*ix]).collect()
        }
    }

    fn build(capacity: usize, gamma: f32, lam: f32) -> RolloutBuffer<Vec<f32>, Vec<f32>> {
        let config = RolloutBufferConfig::default()
            .capacity(capacity)
            .gamma(gamma)
            .lam(lam);
        RolloutBuffer::build(&config)
    }

    fn push(
        buffer: &mut RolloutBuffer<Vec<f32>, Vec<f32>>,
        reward: f32,
        value: f32,
        logp: f32,
    ) -> Result<()> {
        buffer.push(Transition {
            obs: vec![0.0],
            act: vec![0.0],
            reward,
            value,
            logp,
        })
    }

    fn assert_close(xs: &[f32], ys: &[f32]) {
        assert_eq!(xs.len(), ys.len());
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!((x - y).abs() < 1e-5, "{:?} != {:?}", xs, ys);
        }
    }

    #[test]
    fn returns_and_advantages_of_a_single_episode() -> Result<()> {
        // With lam = 1.0 and zero value estimates, the advantage
        // degenerates to the return-to-go.
        let mut buffer = build(3, 0.9, 1.0);
        for _ in 0..3 {
            push(&mut buffer, 1.0, 0.0, 0.0)?;
        }
        buffer.finish_path(0.0);

        assert_close(&buffer.ret, &[2.71, 1.9, 1.0]);
        assert_close(&buffer.adv, &[2.71, 1.9, 1.0]);
        Ok(())
    }

    #[test]
    fn advantages_match_the_reverse_scan_of_td_residuals() -> Result<()> {
        let (gamma, lam) = (0.9, 0.95);
        let mut buffer = build(2, gamma, lam);
        push(&mut buffer, 1.0, 0.5, 0.0)?;
        push(&mut buffer, 2.0, 1.0, 0.0)?;
        buffer.finish_path(2.0);

        // delta[1] = 2.0 + 0.9 * 2.0 - 1.0, delta[0] = 1.0 + 0.9 * 1.0 - 0.5
        let delta = [1.4f32, 2.8];
        let adv1 = delta[1];
        let adv0 = delta[0] + gamma * lam * adv1;
        assert_close(&buffer.adv, &[adv0, adv1]);

        // Returns bootstrap with last_value.
        assert_close(&buffer.ret, &[1.0 + 0.9 * 3.8, 2.0 + 0.9 * 2.0]);
        Ok(())
    }

    #[test]
    fn rewards_do_not_cross_episode_boundaries() -> Result<()> {
        let mut buffer = build(4, 0.9, 1.0);
        for _ in 0..2 {
            push(&mut buffer, 1.0, 0.0, 0.0)?;
        }
        buffer.finish_path(0.0);
        for _ in 0..2 {
            push(&mut buffer, 5.0, 0.0, 0.0)?;
        }
        buffer.finish_path(0.0);

        assert_close(&buffer.ret, &[1.9, 1.0, 9.5, 5.0]);
        Ok(())
    }

    #[test]
    fn push_fails_when_full() -> Result<()> {
        let mut buffer = build(2, 0.99, 0.97);
        push(&mut buffer, 0.0, 0.0, 0.0)?;
        push(&mut buffer, 0.0, 0.0, 0.0)?;

        let err = push(&mut buffer, 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProximError>(),
            Some(ProximError::BufferFull { .. })
        ));
        Ok(())
    }

    #[test]
    fn take_epoch_fails_before_the_buffer_is_full() -> Result<()> {
        let mut buffer = build(2, 0.99, 0.97);
        push(&mut buffer, 0.0, 0.0, 0.0)?;
        buffer.finish_path(0.0);

        let err = buffer.take_epoch().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProximError>(),
            Some(ProximError::BufferNotFull { len: 1, capacity: 2 })
        ));
        Ok(())
    }

    #[test]
    fn advantages_are_normalized_across_the_epoch() -> Result<()> {
        let mut buffer = build(8, 0.9, 0.95);
        for i in 0..8 {
            push(&mut buffer, i as f32, 0.5 * i as f32, 0.0)?;
            if i % 4 == 3 {
                buffer.finish_path(1.0);
            }
        }
        let epoch = buffer.take_epoch()?;

        let n = epoch.adv.len() as f32;
        let mean = epoch.adv.iter().sum::<f32>() / n;
        let std = (epoch.adv.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n).sqrt();
        assert!(mean.abs() < 1e-6);
        assert!((std - 1.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn the_buffer_is_reusable_after_take_epoch() -> Result<()> {
        let mut buffer = build(3, 0.9, 1.0);
        for _ in 0..3 {
            push(&mut buffer, 1.0, 0.0, 0.0)?;
        }
        buffer.finish_path(0.0);
        let _ = buffer.take_epoch()?;

        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.path_start, 0);

        // A fresh epoch fits without error.
        for _ in 0..3 {
            push(&mut buffer, 2.0, 0.0, 0.0)?;
        }
        buffer.finish_path(0.0);
        let epoch = buffer.take_epoch()?;
        assert_eq!(epoch.ret[2], 2.0);
        Ok(())
    }
}
