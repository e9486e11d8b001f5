//! PDB reading for the clustering pipeline.
//!
//! Only the information the engine consumes is extracted: one
//! representative atom per residue (`CA` for amino acids, `C3'` for
//! nucleotides), a one-letter sequence, and the chain's molecule type.
//! The first MODEL of a file is read; each chain identifier becomes one
//! chain record.

use crate::core::io::secondary;
use crate::core::models::chain::{ChainRecord, MoleculeType, ResidueData};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ATOM record on line {line} is shorter than the fixed-column format requires")]
    TruncatedRecord { line: usize },

    #[error("Invalid coordinate field on line {line}: {source}")]
    InvalidCoordinate {
        line: usize,
        #[source]
        source: std::num::ParseFloatError,
    },
}

#[derive(Debug)]
struct RawResidue {
    name: String,
    ca: Option<Point3<f64>>,
    c3: Option<Point3<f64>>,
}

#[derive(Debug)]
struct RawChain {
    tag: char,
    residues: Vec<RawResidue>,
    last_key: String,
}

/// Reads all chains of the first model in a PDB file.
pub fn read_chains(path: &Path) -> Result<Vec<ChainRecord>, PdbError> {
    let file = File::open(path)?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_chains(BufReader::new(file), &source)
}

/// Parses PDB text into chain records. `source` tags the chain
/// identifiers, yielding ids of the form `file.pdb:A`.
pub fn parse_chains(reader: impl BufRead, source: &str) -> Result<Vec<ChainRecord>, PdbError> {
    let mut chains: Vec<RawChain> = Vec::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_index + 1;

        if line.starts_with("ENDMDL") || line.trim_end() == "END" {
            break;
        }
        if !line.starts_with("ATOM  ") {
            continue;
        }

        let field = |range: std::ops::Range<usize>| {
            line.get(range)
                .ok_or(PdbError::TruncatedRecord { line: line_number })
        };

        let atom_name = field(12..16)?.trim();
        let alt_loc = field(16..17)?;
        if !matches!(alt_loc, " " | "A") {
            continue;
        }
        let residue_name = field(17..20)?.trim().to_string();
        let tag = match field(21..22)?.chars().next() {
            Some(' ') | None => '_',
            Some(c) => c,
        };
        let residue_key = field(22..27)?.to_string();

        let parse_coord = |range: std::ops::Range<usize>| -> Result<f64, PdbError> {
            field(range)?
                .trim()
                .parse()
                .map_err(|source| PdbError::InvalidCoordinate {
                    line: line_number,
                    source,
                })
        };
        let position = Point3::new(
            parse_coord(30..38)?,
            parse_coord(38..46)?,
            parse_coord(46..54)?,
        );

        let chain_index = match chains.iter().position(|c| c.tag == tag) {
            Some(index) => index,
            None => {
                chains.push(RawChain {
                    tag,
                    residues: Vec::new(),
                    last_key: String::new(),
                });
                chains.len() - 1
            }
        };
        let chain = &mut chains[chain_index];

        if chain.last_key != residue_key || chain.residues.is_empty() {
            chain.residues.push(RawResidue {
                name: residue_name,
                ca: None,
                c3: None,
            });
            chain.last_key = residue_key;
        }
        if let Some(residue) = chain.residues.last_mut() {
            match atom_name {
                "CA" if residue.ca.is_none() => residue.ca = Some(position),
                "C3'" if residue.c3.is_none() => residue.c3 = Some(position),
                _ => {}
            }
        }
    }

    Ok(chains
        .into_iter()
        .filter_map(|chain| build_record(chain, source))
        .collect())
}

fn build_record(raw: RawChain, source: &str) -> Option<ChainRecord> {
    let mol_score: i32 = raw
        .residues
        .iter()
        .map(|r| {
            if nucleotide_letter(&r.name).is_some() {
                1
            } else if amino_letter(&r.name).is_some() {
                -1
            } else {
                0
            }
        })
        .sum();
    let mol = MoleculeType::from_sign(mol_score);

    let mut seq = Vec::new();
    let mut coords = Vec::new();
    for residue in &raw.residues {
        let position = match mol {
            MoleculeType::Protein => residue.ca,
            MoleculeType::Rna => residue.c3,
        };
        let Some(position) = position else { continue };
        let letter = match mol {
            MoleculeType::Protein => amino_letter(&residue.name).unwrap_or(b'X'),
            MoleculeType::Rna => nucleotide_letter(&residue.name).unwrap_or(b'x'),
        };
        seq.push(letter);
        coords.push(position);
    }

    if coords.is_empty() {
        tracing::warn!(
            chain = %raw.tag,
            source,
            "chain has no usable representative atoms, skipping"
        );
        return None;
    }

    let sec = secondary::assign(&coords, mol);
    Some(ChainRecord::new(
        format!("{source}:{}", raw.tag),
        mol,
        ResidueData { seq, sec, coords },
    ))
}

fn amino_letter(residue_name: &str) -> Option<u8> {
    let letter = match residue_name {
        "ALA" => b'A',
        "ARG" => b'R',
        "ASN" => b'N',
        "ASP" => b'D',
        "CYS" => b'C',
        "GLN" => b'Q',
        "GLU" => b'E',
        "GLY" => b'G',
        "HIS" => b'H',
        "ILE" => b'I',
        "LEU" => b'L',
        "LYS" => b'K',
        "MET" => b'M',
        "MSE" => b'M',
        "PHE" => b'F',
        "PRO" => b'P',
        "SER" => b'S',
        "THR" => b'T',
        "TRP" => b'W',
        "TYR" => b'Y',
        "VAL" => b'V',
        _ => return None,
    };
    Some(letter)
}

fn nucleotide_letter(residue_name: &str) -> Option<u8> {
    let letter = match residue_name {
        "A" | "DA" => b'a',
        "C" | "DC" => b'c',
        "G" | "DG" => b'g',
        "U" => b'u',
        "DT" => b't',
        "I" | "DI" => b'i',
        _ => return None,
    };
    Some(letter)
}
