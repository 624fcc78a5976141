mod error;
mod file_slot_store;
mod memory_slot_store;
mod slot_store;

pub use error::StoreError;
pub use file_slot_store::FileSlotStore;
pub use memory_slot_store::MemorySlotStore;
pub use slot_store::{decode_slot, decode_slot_strict, encode_slot, SlotStore};
