/*!
 * Wire Layer
 * Tag sets for both physical encodings and the stream capabilities the
 * codec reads and writes through
 */

pub mod stream;
pub mod tags;

pub use stream::{ByteSink, ByteSource, ReaderSource, SliceSource, WriterSink};
pub use tags::BinaryTag;
