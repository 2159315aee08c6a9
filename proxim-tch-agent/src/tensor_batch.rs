use proxim_core::rollout_buffer::BatchBase;
use tch::Tensor;

/// A batch of observations or actions backed by a [`Tensor`].
///
/// The internal buffer has the shape `[capacity, shape[1..]]`, where
/// `shape` is taken from the data pushed the first time via
/// [`TensorBatch::push`]; the first axis of the pushed data is the batch
/// size. The data kind is taken from the first pushed tensor as well.
pub struct TensorBatch {
    buf: Option<Tensor>,
    capacity: i64,
}

impl TensorBatch {
    /// Wraps a tensor whose first axis is the batch axis.
    pub fn from_tensor(t: Tensor) -> Self {
        let capacity = t.size()[0];
        Self {
            buf: Some(t),
            capacity,
        }
    }
}

impl BatchBase for TensorBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: None,
            capacity: capacity as _,
        }
    }

    /// Pushes given data.
    ///
    /// If the internal buffer is empty, it is initialized with the shape
    /// `[capacity, data.size()[1..]]` and the kind of the given data.
    fn push(&mut self, index: usize, data: Self) {
        let data = match data.buf {
            Some(data) => data,
            None => return,
        };

        let batch_size = data.size()[0];
        if batch_size == 0 {
            return;
        }

        if self.buf.is_none() {
            let mut shape = data.size();
            shape[0] = self.capacity;
            self.buf = Some(Tensor::zeros(&shape, (data.kind(), data.device())));
        }
        let buf = self.buf.as_ref().unwrap();

        for i in 0..batch_size {
            let ix = (index as i64 + i) % self.capacity;
            let mut dst = buf.get(ix);
            dst.copy_(&data.get(i));
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        let ixs = Tensor::from_slice(&ixs.iter().map(|&ix| ix as i64).collect::<Vec<_>>());
        let buf = self.buf.as_ref().unwrap().index_select(0, &ixs);
        Self::from_tensor(buf)
    }
}

impl From<Tensor> for TensorBatch {
    fn from(t: Tensor) -> Self {
        Self::from_tensor(t)
    }
}

impl From<TensorBatch> for Tensor {
    fn from(b: TensorBatch) -> Self {
        b.buf.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_sample_round_trip() {
        let mut batch = TensorBatch::new(3);
        for i in 0..3 {
            let data = Tensor::from_slice(&[i as f32, -(i as f32)]).unsqueeze(0);
            batch.push(i, TensorBatch::from_tensor(data));
        }

        let sampled: Tensor = batch.sample(&vec![2, 0]).into();
        assert_eq!(sampled.size(), vec![2, 2]);
        assert_eq!(Vec::<f32>::try_from(sampled.get(0)).unwrap(), vec![2.0, -2.0]);
        assert_eq!(Vec::<f32>::try_from(sampled.get(1)).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn the_buffer_takes_its_kind_from_the_first_push() {
        let mut batch = TensorBatch::new(2);
        let data = Tensor::from_slice(&[1i64]).unsqueeze(0);
        batch.push(0, TensorBatch::from_tensor(data));

        let sampled: Tensor = batch.sample(&vec![0]).into();
        assert_eq!(sampled.kind(), tch::Kind::Int64);
    }
}
