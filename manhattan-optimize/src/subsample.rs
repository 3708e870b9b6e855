/// Uniformly picks at most `limit` items out of `data`, preserving their order.
///
/// * If there are no more than `limit` items, all are kept.
/// * A limit of one keeps the middle item.
/// * A limit of two keeps the first and last items.
/// * Otherwise every `ceil(len / limit)`-th item is kept, and the last item is appended if
///   that leaves exactly one slot unused.
pub fn uniform_subsample<T: Clone>(data: &[T], limit: usize) -> Vec<T> {
    match limit {
        _ if data.len() <= limit => data.to_vec(),
        0 => vec![],
        1 => vec![data[data.len() / 2].clone()],
        2 => vec![data[0].clone(), data[data.len() - 1].clone()],
        _ => {
            let step = (data.len() + limit - 1) / limit;
            let mut filtered: Vec<T> = data.iter().step_by(step).cloned().collect();
            if filtered.len() == limit - 1 {
                filtered.push(data[data.len() - 1].clone());
            }
            filtered
        }
    }
}
