use tokio::sync::mpsc;

use crate::{actor::ActorError, handler::MessageHandler, Actor};

type Envelope<A> = Box<dyn MessageHandler<A>>;

pub struct BoundedMailbox<A: Actor>(mpsc::Sender<Envelope<A>>);

impl<A: Actor> Clone for BoundedMailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A> BoundedMailbox<A>
where
    A: Actor,
{
    pub async fn send<M>(&self, message: M) -> Result<(), ActorError>
    where
        M: MessageHandler<A> + 'static,
    {
        self.0.send(Box::new(message)).await?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

pub struct BoundedMailboxReceiver<A: Actor>(mpsc::Receiver<Envelope<A>>);

impl<A> BoundedMailboxReceiver<A>
where
    A: Actor,
{
    pub async fn recv(&mut self) -> Option<Envelope<A>> {
        self.0.recv().await
    }

    pub fn close(&mut self) {
        self.0.close()
    }
}

pub fn bounded_mailbox<A>(buffer: usize) -> (BoundedMailbox<A>, BoundedMailboxReceiver<A>)
where
    A: Actor,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (BoundedMailbox(tx), BoundedMailboxReceiver(rx))
}
