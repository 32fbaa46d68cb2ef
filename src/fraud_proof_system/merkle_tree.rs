// src/fraud_proof_system/merkle_tree.rs
//! Merkle Tree implementation for the Fraud Proof System
//!
//! Binary keccak256 tree over an ordered sequence of leaf hashes. When a level
//! has an odd number of nodes the last node is paired with itself, so every
//! leaf of an `n`-leaf tree has a proof of exactly `ceil(log2(n))` siblings.
//! Proof generation and verification follow the same pairing rule bit for bit.

use ethereum_types::H256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors raised while building a tree or a proof
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// No leaves were supplied
    #[error("Cannot build a Merkle tree from an empty leaf set")]
    EmptyLeafSet,

    /// Requested leaf does not exist
    #[error("Leaf index {index} out of range for a tree of {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Inclusion proof for a single leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Position of the leaf in the ordered leaf sequence
    pub index: u64,

    /// Sibling hashes from the leaf level up to (excluding) the root
    pub siblings: Vec<H256>,
}

impl MerkleProof {
    /// Verify this proof for `leaf` against `root`
    pub fn verify(&self, leaf: H256, root: H256) -> bool {
        verify_proof(leaf, &self.siblings, self.index, root)
    }

    /// Number of levels covered by the proof
    pub fn height(&self) -> usize {
        self.siblings.len()
    }
}

/// keccak256 of arbitrary bytes
pub fn keccak256(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}

/// Hash two nodes together, `left` first
pub fn hash_pair(left: &H256, right: &H256) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    H256::from_slice(&hasher.finalize())
}

fn next_level(level: &[H256]) -> Vec<H256> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            hash_pair(left, right)
        })
        .collect()
}

/// Compute the root of an ordered, non-empty leaf sequence
pub fn build_root(leaves: &[H256]) -> Result<H256, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::EmptyLeafSet);
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }

    Ok(level[0])
}

/// Generate the inclusion proof for the leaf at `index`
pub fn build_proof(leaves: &[H256], index: usize) -> Result<MerkleProof, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::EmptyLeafSet);
    }
    if index >= leaves.len() {
        return Err(MerkleError::IndexOutOfRange {
            index,
            len: leaves.len(),
        });
    }

    let mut siblings = Vec::new();
    let mut level = leaves.to_vec();
    let mut position = index;

    while level.len() > 1 {
        let sibling = if position % 2 == 0 {
            // Last node of an odd level is its own sibling
            *level.get(position + 1).unwrap_or(&level[position])
        } else {
            level[position - 1]
        };
        siblings.push(sibling);

        level = next_level(&level);
        position /= 2;
    }

    Ok(MerkleProof {
        index: index as u64,
        siblings,
    })
}

/// Recompute the root from `leaf` and `proof` and compare it with `expected_root`.
///
/// Bit `k` of `index` selects the concatenation order at level `k`: a zero bit
/// means the running hash is the left child. Indices with bits set above the
/// proof height never verify. A node padded by duplication verifies at both
/// its own position and the padded one, so callers that need a unique
/// position must bind it some other way.
pub fn verify_proof(leaf: H256, proof: &[H256], index: u64, expected_root: H256) -> bool {
    if index.checked_shr(proof.len() as u32).unwrap_or(0) != 0 {
        return false;
    }

    let mut current = leaf;
    for (level, sibling) in proof.iter().enumerate() {
        let bit = index.checked_shr(level as u32).unwrap_or(0) & 1;
        current = if bit == 0 {
            hash_pair(&current, sibling)
        } else {
            hash_pair(sibling, &current)
        };
    }

    current == expected_root
}

/// Owning Merkle tree with a cached root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    leaves: Vec<H256>,
    root: H256,
}

impl MerkleTree {
    /// Create a new Merkle tree from leaves
    pub fn new(leaves: Vec<H256>) -> Result<Self, MerkleError> {
        let root = build_root(&leaves)?;
        Ok(Self { leaves, root })
    }

    /// Get the root of the tree
    pub fn root(&self) -> H256 {
        self.root
    }

    /// Height of the tree, equal to the length of every proof
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut width = self.leaves.len();
        while width > 1 {
            width = (width + 1) / 2;
            height += 1;
        }
        height
    }

    /// Generate a Merkle proof for a leaf
    pub fn generate_proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        build_proof(&self.leaves, index)
    }

    /// Replace a leaf and recompute the root
    pub fn update_leaf(&mut self, index: usize, leaf: H256) -> Result<(), MerkleError> {
        let len = self.leaves.len();
        let slot = self
            .leaves
            .get_mut(index)
            .ok_or(MerkleError::IndexOutOfRange { index, len })?;
        *slot = leaf;
        self.root = build_root(&self.leaves)?;
        Ok(())
    }

    /// Get the number of leaves in the tree
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Always false: a tree cannot be built without leaves
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Get a leaf from the tree
    pub fn leaf(&self, index: usize) -> Option<H256> {
        self.leaves.get(index).copied()
    }

    /// Get all leaves from the tree
    pub fn leaves(&self) -> &[H256] {
        &self.leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> H256 {
        H256::repeat_byte(byte)
    }

    #[test]
    fn test_merkle_tree() {
        let leaves: Vec<H256> = (1..=8).map(leaf).collect();
        let mut tree = MerkleTree::new(leaves.clone()).unwrap();
        let root = tree.root();
        assert_ne!(root, H256::zero());
        assert_eq!(tree.height(), 3);

        for (i, l) in leaves.iter().enumerate() {
            let proof = tree.generate_proof(i).unwrap();
            assert_eq!(proof.height(), 3);
            assert!(proof.verify(*l, root), "Proof verification failed for leaf {}", i);
        }

        let proof = tree.generate_proof(0).unwrap();
        assert!(!proof.verify(leaf(9), root), "Proof should fail for an incorrect leaf");

        tree.update_leaf(0, leaf(10)).unwrap();
        let new_root = tree.root();
        assert_ne!(root, new_root, "Root should change after leaf update");

        let proof = tree.generate_proof(0).unwrap();
        assert!(proof.verify(leaf(10), new_root));
    }

    #[test]
    fn test_empty_leaf_set() {
        assert_eq!(MerkleTree::new(Vec::new()), Err(MerkleError::EmptyLeafSet));
        assert_eq!(build_root(&[]), Err(MerkleError::EmptyLeafSet));
        assert_eq!(build_proof(&[], 0), Err(MerkleError::EmptyLeafSet));
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = MerkleTree::new(vec![leaf(1)]).unwrap();
        assert_eq!(tree.root(), leaf(1), "Single leaf tree root should be the leaf");
        assert_eq!(tree.height(), 0);

        let proof = tree.generate_proof(0).unwrap();
        assert!(proof.siblings.is_empty(), "Proof for single leaf tree should be empty");
        assert!(proof.verify(leaf(1), tree.root()));
    }

    #[test]
    fn test_two_leaf_root_is_hash_of_concatenation() {
        let mut packed = Vec::new();
        packed.extend_from_slice(leaf(1).as_bytes());
        packed.extend_from_slice(leaf(2).as_bytes());

        assert_eq!(build_root(&[leaf(1), leaf(2)]).unwrap(), keccak256(&packed));
    }

    #[test]
    fn test_odd_level_duplicates_last_node() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let expected = hash_pair(&hash_pair(&a, &b), &hash_pair(&c, &c));
        assert_eq!(build_root(&[a, b, c]).unwrap(), expected);

        let proof = build_proof(&[a, b, c], 2).unwrap();
        assert_eq!(proof.siblings, vec![c, hash_pair(&a, &b)]);

        // The padded copy sits at index 3 and verifies there too
        let root = build_root(&[a, b, c]).unwrap();
        assert!(verify_proof(c, &proof.siblings, 2, root));
        assert!(verify_proof(c, &proof.siblings, 3, root));
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(
            build_proof(&[leaf(1), leaf(2)], 2),
            Err(MerkleError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_index_above_height_is_rejected() {
        let leaves = [leaf(1), leaf(2)];
        let root = build_root(&leaves).unwrap();
        let proof = build_proof(&leaves, 0).unwrap();

        assert!(verify_proof(leaf(1), &proof.siblings, 0, root));
        // Same low bit, extra high bit
        assert!(!verify_proof(leaf(1), &proof.siblings, 2, root));
        assert!(!verify_proof(leaf(1), &[], 1, leaf(1)));
    }

    #[test]
    fn test_wrong_index_fails() {
        let leaves: Vec<H256> = (1..=4).map(leaf).collect();
        let root = build_root(&leaves).unwrap();
        let proof = build_proof(&leaves, 1).unwrap();
        assert!(!verify_proof(leaves[1], &proof.siblings, 0, root));
    }
}
