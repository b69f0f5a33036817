use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::future::join_all;
use futures_util::FutureExt;

/// Outcome of one task in a settle-all group.
#[derive(Debug)]
pub enum Settled<T> {
    Fulfilled(T),
    Panicked(String),
}

impl<T> Settled<T> {
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Settled::Fulfilled(value) => Ok(value),
            Settled::Panicked(message) => Err(message),
        }
    }
}

/// Runs every future concurrently and waits for all of them, isolating
/// panics per task. Output order matches input order.
pub async fn settle_all<I, F, T>(futures: I) -> Vec<Settled<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    let guarded = futures
        .into_iter()
        .map(|future| AssertUnwindSafe(future).catch_unwind());

    join_all(guarded)
        .await
        .into_iter()
        .map(|outcome| match outcome {
            Ok(value) => Settled::Fulfilled(value),
            Err(payload) => Settled::Panicked(panic_message(payload.as_ref())),
        })
        .collect()
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn keeps_input_order_and_isolates_panics() {
        let tasks = (0..4u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(40 - i * 10)).await;
            if i == 2 {
                panic!("task {} exploded", i);
            }
            i * 10
        });

        let settled = settle_all(tasks).await;

        let outcomes: Vec<Result<u64, String>> =
            settled.into_iter().map(Settled::into_result).collect();
        assert_eq!(outcomes[0], Ok(0));
        assert_eq!(outcomes[1], Ok(10));
        assert_eq!(outcomes[2], Err("task 2 exploded".to_string()));
        assert_eq!(outcomes[3], Ok(30));
    }

    #[test]
    fn panic_message_handles_str_and_string_payloads() {
        let text: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7u8);

        assert_eq!(panic_message(text.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
