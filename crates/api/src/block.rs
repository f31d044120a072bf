//! A unit of work handed to a single worker.

/// A materialized candidate, one alphabet character per position digit.
///
/// The worker owns the block once it is returned from
/// [Dealer::next_block](crate::Dealer::next_block) and is free to
/// overwrite the low-order positions while it enumerates them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Block(Vec<u8>);

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Block")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl std::ops::Deref for Block {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Block {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<u8>> for Block {
    fn from(b: Vec<u8>) -> Self {
        Self(b)
    }
}

impl From<Block> for Vec<u8> {
    fn from(b: Block) -> Self {
        b.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn block_is_scratch_space() {
        let mut b = Block::from(b"0000abcd".to_vec());
        b[..4].copy_from_slice(b"~~~~");
        assert_eq!("~~~~abcd", b.to_string());
        assert_eq!("Block(\"~~~~abcd\")", format!("{b:?}"));
    }
}
