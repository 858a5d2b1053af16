use std::future::Future;

/// Run `step` over `items` one at a time, in order.
///
/// `before` is called with the item's position just before its step
/// starts, which is where progress is reported. Each step starts only after
/// the previous one has finished; outputs keep the input order.
pub async fn run_sequential<T, O, Fut>(
    items: impl IntoIterator<Item = T>,
    mut before: impl FnMut(usize, &T),
    mut step: impl FnMut(T) -> Fut,
) -> Vec<O>
where
    Fut: Future<Output = O>,
{
    let mut outputs = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        before(index, &item);
        outputs.push(step(item).await);
    }
    outputs
}
