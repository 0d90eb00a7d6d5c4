use std::any::Any;

use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStrategy {
    /// Keep the actor and its state and continue with the next message.
    Resume,
    /// Drop the actor and close its mailbox.
    Stop,
}

pub trait Actor: Send + Sync + 'static {
    /// Name used when logging about this actor.
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_owned()
    }

    /// Called when a handler on the actor panics. The return value represents the
    /// supervision strategy used to handle the panic. Actors own long lived
    /// state, so the default is to resume.
    /// NOTE: If this method panics, the actor can not recover from the panic.
    #[allow(unused_variables)]
    fn on_fail(&mut self, error: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Resume
    }

    /// Called once after the mailbox is closed or the actor was stopped.
    fn on_stop(&mut self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("the actor's mailbox is closed")]
    MailboxClosed,
    #[error("the actor dropped the request without answering: {0}")]
    NoAnswer(#[from] oneshot::error::RecvError),
}

impl<T> From<mpsc::error::SendError<T>> for ActorError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::MailboxClosed
    }
}
