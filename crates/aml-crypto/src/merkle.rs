use aml_types::BlockHash;
use serde::{Deserialize, Serialize};

/// Side of a sibling hash in a Merkle proof path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Binary Merkle tree over record leaf hashes.
///
/// Leaves are taken in input (arrival) order. An odd leaf at any level is
/// paired with itself (duplicate-last policy), keeping the tree binary and
/// the root deterministic for a given ordered leaf sequence.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    root: BlockHash,
    /// Node hashes level by level; level 0 holds the leaves.
    levels: Vec<Vec<BlockHash>>,
}

/// Compute just the Merkle root for an ordered leaf sequence.
pub fn merkle_root(leaves: &[BlockHash]) -> BlockHash {
    MerkleTree::build(leaves.to_vec()).root()
}

impl MerkleTree {
    /// Build a tree from ordered leaf hashes.
    ///
    /// An empty sequence produces the zero root; a single leaf is its own
    /// root.
    pub fn build(leaves: Vec<BlockHash>) -> Self {
        if leaves.is_empty() {
            return Self {
                root: BlockHash::zero(),
                levels: vec![],
            };
        }

        let mut levels = vec![leaves];
        while levels[levels.len() - 1].len() > 1 {
            let current = &levels[levels.len() - 1];
            let mut parents = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let right = pair.get(1).unwrap_or(&pair[0]);
                parents.push(hash_pair(&pair[0], right));
            }
            levels.push(parents);
        }

        let root = levels[levels.len() - 1][0];
        Self { root, levels }
    }

    /// The root hash of the tree.
    pub fn root(&self) -> BlockHash {
        self.root
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut path = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling_idx, side) = if idx % 2 == 0 {
                (idx + 1, Side::Right)
            } else {
                (idx - 1, Side::Left)
            };
            // Odd node at the end of a level pairs with itself.
            let sibling = *level.get(sibling_idx).unwrap_or(&level[idx]);
            path.push((sibling, side));
            idx /= 2;
        }

        Some(MerkleProof {
            leaf: self.levels[0][index],
            path,
            root: self.root,
        })
    }
}

/// Merkle inclusion proof: the sibling path from a leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The leaf hash being proven.
    pub leaf: BlockHash,
    /// `(sibling_hash, sibling_side)` pairs from leaf level to root.
    pub path: Vec<(BlockHash, Side)>,
    /// Expected root hash.
    pub root: BlockHash,
}

impl MerkleProof {
    /// Recompute the root from the leaf and path and compare.
    pub fn verify(&self) -> bool {
        let mut current = self.leaf;
        for (sibling, side) in &self.path {
            current = match side {
                Side::Left => hash_pair(sibling, &current),
                Side::Right => hash_pair(&current, sibling),
            };
        }
        current == self.root
    }
}

fn hash_pair(left: &BlockHash, right: &BlockHash) -> BlockHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"aml-merkle-v1:");
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    BlockHash::new(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(seed: u8) -> BlockHash {
        BlockHash::new([seed; 32])
    }

    #[test]
    fn empty_tree_has_zero_root() {
        let tree = MerkleTree::build(vec![]);
        assert!(tree.root().is_zero());
        assert_eq!(tree.leaf_count(), 0);
        assert!(tree.proof(0).is_none());
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let l = leaf(1);
        let tree = MerkleTree::build(vec![l]);
        assert_eq!(tree.root(), l);
        let proof = tree.proof(0).unwrap();
        assert!(proof.path.is_empty());
        assert!(proof.verify());
    }

    #[test]
    fn root_depends_on_leaf_order() {
        let ab = merkle_root(&[leaf(1), leaf(2)]);
        let ba = merkle_root(&[leaf(2), leaf(1)]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn odd_leaf_is_paired_with_itself() {
        // Three leaves: the third is hashed against itself at level 0.
        let root3 = merkle_root(&[leaf(1), leaf(2), leaf(3)]);
        let root4 = merkle_root(&[leaf(1), leaf(2), leaf(3), leaf(3)]);
        assert_eq!(root3, root4);
    }

    #[test]
    fn proofs_verify_for_every_leaf() {
        let leaves: Vec<BlockHash> = (0..7).map(leaf).collect();
        let tree = MerkleTree::build(leaves.clone());
        for i in 0..leaves.len() {
            let proof = tree.proof(i).expect("proof exists");
            assert_eq!(proof.leaf, leaves[i]);
            assert_eq!(proof.root, tree.root());
            assert!(proof.verify(), "proof for leaf {i} should verify");
        }
    }

    #[test]
    fn proof_out_of_bounds_is_none() {
        let tree = MerkleTree::build(vec![leaf(1), leaf(2)]);
        assert!(tree.proof(2).is_none());
    }

    #[test]
    fn tampered_leaf_fails_verification() {
        let tree = MerkleTree::build(vec![leaf(1), leaf(2), leaf(3), leaf(4)]);
        let mut proof = tree.proof(1).unwrap();
        proof.leaf = leaf(99);
        assert!(!proof.verify());
    }

    #[test]
    fn proof_against_wrong_root_fails() {
        let tree = MerkleTree::build(vec![leaf(1), leaf(2)]);
        let other = MerkleTree::build(vec![leaf(3), leaf(4)]);
        let mut proof = tree.proof(0).unwrap();
        proof.root = other.root();
        assert!(!proof.verify());
    }

    #[test]
    fn power_of_two_depth() {
        let leaves: Vec<BlockHash> = (0..8).map(leaf).collect();
        let tree = MerkleTree::build(leaves);
        let proof = tree.proof(5).unwrap();
        assert_eq!(proof.path.len(), 3); // log2(8)
        assert!(proof.verify());
    }

    #[test]
    fn proof_serde_roundtrip() {
        let tree = MerkleTree::build((0..5).map(leaf).collect());
        let proof = tree.proof(4).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        let parsed: MerkleProof = serde_json::from_str(&json).unwrap();
        assert_eq!(proof, parsed);
        assert!(parsed.verify());
    }

    proptest! {
        #[test]
        fn every_proof_verifies(seeds in proptest::collection::vec(any::<[u8; 32]>(), 1..40)) {
            let leaves: Vec<BlockHash> = seeds.into_iter().map(BlockHash::new).collect();
            let tree = MerkleTree::build(leaves.clone());
            for i in 0..leaves.len() {
                let proof = tree.proof(i).unwrap();
                prop_assert!(proof.verify());
            }
        }

        #[test]
        fn root_is_deterministic(seeds in proptest::collection::vec(any::<[u8; 32]>(), 0..40)) {
            let leaves: Vec<BlockHash> = seeds.into_iter().map(BlockHash::new).collect();
            prop_assert_eq!(merkle_root(&leaves), merkle_root(&leaves));
        }
    }
}
