/// Event ordering, regions and control requests of the reference queue.
pub mod queue;
