use crate::adapters::queue::ScoreQueue;
use crate::storage::Storage;

pub trait Context: Send + Sync {
    fn storage(&self) -> &dyn Storage;
    fn queue(&self) -> &dyn ScoreQueue;
}
