pub mod pdb;
pub mod secondary;
