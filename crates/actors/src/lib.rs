use std::panic::AssertUnwindSafe;

use actor::{Actor, SupervisionStrategy};
use actor_ref::ActorRef;
use futures::FutureExt;
use mailbox::bounded_mailbox;

pub mod actor;
pub mod actor_ref;
pub mod handler;
pub mod mailbox;

pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Creates and runs an actor with the default mailbox capacity.
/// See [`run_with_capacity`].
pub fn run<A: Actor>(actor: A) -> ActorRef<A> {
    run_with_capacity(actor, DEFAULT_MAILBOX_CAPACITY)
}

/// Creates and runs an actor. Messages are handled one at a time in the order
/// they arrived. If a handler panics, the actor is either resumed with its
/// current state or stopped according to `Actor::on_fail()`.
/// Must be called from within a tokio runtime.
pub fn run_with_capacity<A: Actor>(mut actor: A, capacity: usize) -> ActorRef<A> {
    let (tx, mut rx) = bounded_mailbox(capacity);
    let actor_ref = ActorRef::new(tx);

    tokio::spawn(async move {
        while let Some(mut message) = rx.recv().await {
            let result = AssertUnwindSafe(message.handle(&mut actor))
                .catch_unwind()
                .await;
            // handler paniced?
            if let Err(why) = result {
                log::error!("actor {} paniced: {:?}", actor.name(), why);
                match actor.on_fail(why) {
                    SupervisionStrategy::Resume => {}
                    SupervisionStrategy::Stop => {
                        rx.close();
                        break;
                    }
                };
            }
        }
        actor.on_stop();
    });

    actor_ref
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use async_trait::async_trait;

    use super::*;
    use crate::handler::{Handler, Message};

    struct Counter {
        count: i64,
        strategy: SupervisionStrategy,
    }

    struct Increment(i64);

    impl Message for Increment {
        type Response = ();
    }

    struct GetValue;

    impl Message for GetValue {
        type Response = i64;
    }

    struct Explode;

    impl Message for Explode {
        type Response = ();
    }

    impl Actor for Counter {
        fn on_fail(&mut self, _: Box<dyn Any + Send>) -> SupervisionStrategy {
            self.strategy
        }
    }

    #[async_trait]
    impl Handler<Increment> for Counter {
        async fn handle(&mut self, message: Increment) {
            self.count += message.0;
        }
    }

    #[async_trait]
    impl Handler<GetValue> for Counter {
        async fn handle(&mut self, _: GetValue) -> i64 {
            self.count
        }
    }

    #[async_trait]
    impl Handler<Explode> for Counter {
        async fn handle(&mut self, _: Explode) {
            panic!("boom");
        }
    }

    fn counter(strategy: SupervisionStrategy) -> ActorRef<Counter> {
        run(Counter { count: 0, strategy })
    }

    #[tokio::test]
    async fn test_tell_then_ask_is_ordered() {
        let actor_ref = counter(SupervisionStrategy::Resume);
        actor_ref.tell(Increment(1)).await.unwrap();
        actor_ref.tell(Increment(5)).await.unwrap();
        actor_ref.tell(Increment(-2)).await.unwrap();
        assert_eq!(actor_ref.ask(GetValue).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_resume_keeps_state_after_panic() {
        let actor_ref = counter(SupervisionStrategy::Resume);
        actor_ref.tell(Increment(3)).await.unwrap();
        assert!(actor_ref.ask(Explode).await.is_err());
        assert_eq!(actor_ref.ask(GetValue).await.unwrap(), 3);
        assert!(actor_ref.is_alive());
    }

    #[tokio::test]
    async fn test_stop_closes_mailbox() {
        let actor_ref = counter(SupervisionStrategy::Stop);
        assert!(actor_ref.ask(Explode).await.is_err());
        assert!(actor_ref.ask(GetValue).await.is_err());
        assert!(!actor_ref.is_alive());
    }
}
