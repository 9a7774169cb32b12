pub mod conll;

pub use self::conll::{read_upto, write_sentence, ConllReader};
