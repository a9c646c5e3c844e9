use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectivityError {
    #[error("Invalid atom index '{value}' on connectivity line {line}")]
    InvalidIndex { line: usize, value: String },
}

/// An ordered connectivity table mapping an owner atom index to its bonded partners.
///
/// Owners are kept in first-insertion order, which mirrors the order in which
/// `CONECT` records appear in the source file. Indices are 0-based positions in
/// the owning structure's atom list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityTable {
    /// Owner/partner entries in insertion order.
    entries: Vec<(usize, Vec<usize>)>,
    /// Lookup from owner index to its slot in `entries`.
    slots: HashMap<usize, usize>,
}

impl ConnectivityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `partners` to the partner list of `owner`.
    ///
    /// A repeated owner extends its existing entry instead of creating a new one,
    /// so continuation `CONECT` lines accumulate on the same atom.
    pub fn extend_partners(&mut self, owner: usize, partners: impl IntoIterator<Item = usize>) {
        let slot = match self.slots.get(&owner) {
            Some(&slot) => slot,
            None => {
                self.entries.push((owner, Vec::new()));
                let slot = self.entries.len() - 1;
                self.slots.insert(owner, slot);
                slot
            }
        };
        self.entries[slot].1.extend(partners);
    }

    pub fn partners(&self, owner: usize) -> Option<&[usize]> {
        self.slots
            .get(&owner)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.entries
            .iter()
            .map(|(owner, partners)| (*owner, partners.as_slice()))
    }

    /// Number of owners that have an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the table as a connectivity text block with every index shifted by `offset`.
    ///
    /// Each owner with at least one partner produces one line of the form
    /// `<owner+offset> <partner1+offset> ...`; lines are joined with `\n` and
    /// follow the table's iteration order. Indices are not range-checked.
    ///
    /// # Arguments
    ///
    /// * `offset` - The amount added to every owner and partner index.
    ///
    /// # Return
    ///
    /// The text block, or an empty string when no owner has partners.
    pub fn to_block(&self, offset: usize) -> String {
        self.lines(offset).collect::<Vec<_>>().join("\n")
    }

    /// Yields the individual lines of [`to_block`](Self::to_block).
    pub fn lines(&self, offset: usize) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .filter(|(_, partners)| !partners.is_empty())
            .map(move |(owner, partners)| {
                std::iter::once(owner)
                    .chain(partners.iter())
                    .map(|idx| (idx + offset).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
    }

    /// Parses a connectivity text block back into a table.
    ///
    /// Blank lines are skipped. A line holding only an owner index yields an
    /// entry with no partners.
    pub fn parse_block(block: &str) -> Result<Self, ConnectivityError> {
        let mut table = Self::new();
        for (line_num, line) in block.lines().enumerate() {
            let mut indices = Vec::new();
            for token in line.split_whitespace() {
                let idx = token
                    .parse::<usize>()
                    .map_err(|_| ConnectivityError::InvalidIndex {
                        line: line_num + 1,
                        value: token.to_string(),
                    })?;
                indices.push(idx);
            }
            if let Some((&owner, partners)) = indices.split_first() {
                table.extend_partners(owner, partners.iter().copied());
            }
        }
        Ok(table)
    }
}

impl fmt::Display for ConnectivityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_block(0))
    }
}

impl FromIterator<(usize, Vec<usize>)> for ConnectivityTable {
    fn from_iter<T: IntoIterator<Item = (usize, Vec<usize>)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (owner, partners) in iter {
            table.extend_partners(owner, partners);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ConnectivityTable {
        [(0, vec![1, 2]), (1, vec![0]), (2, vec![0])]
            .into_iter()
            .collect()
    }

    #[test]
    fn empty_table_renders_empty_block() {
        let table = ConnectivityTable::new();
        assert!(table.is_empty());
        assert_eq!(table.to_block(0), "");
        assert_eq!(table.to_block(7), "");
    }

    #[test]
    fn to_block_without_offset_lists_owner_then_partners() {
        assert_eq!(sample_table().to_block(0), "0 1 2\n1 0\n2 0");
    }

    #[test]
    fn to_block_applies_offset_to_owner_and_partners() {
        assert_eq!(sample_table().to_block(10), "10 11 12\n11 10\n12 10");
    }

    #[test]
    fn to_block_preserves_insertion_order_not_numeric_order() {
        let table: ConnectivityTable = [(5, vec![4]), (1, vec![2]), (3, vec![1])]
            .into_iter()
            .collect();
        assert_eq!(table.to_block(0), "5 4\n1 2\n3 1");
    }

    #[test]
    fn owners_without_partners_produce_no_line() {
        let mut table = ConnectivityTable::new();
        table.extend_partners(0, [1]);
        table.extend_partners(4, []);
        assert_eq!(table.len(), 2);
        assert_eq!(table.to_block(0), "0 1");
    }

    #[test]
    fn repeated_owner_appends_to_existing_entry() {
        let mut table = ConnectivityTable::new();
        table.extend_partners(3, [1, 2, 4, 5]);
        table.extend_partners(0, [3]);
        table.extend_partners(3, [6]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.partners(3), Some(&[1, 2, 4, 5, 6][..]));
        assert_eq!(table.to_block(0), "3 1 2 4 5 6\n0 3");
    }

    #[test]
    fn partner_indices_are_passed_through_without_range_checks() {
        let table: ConnectivityTable = [(0, vec![999])].into_iter().collect();
        assert_eq!(table.to_block(1), "1 1000");
    }

    /// Tables covering the empty case, partnerless owners, descending and
    /// interleaved owner order, and a batch of pseudo-random layouts.
    fn table_corpus() -> Vec<ConnectivityTable> {
        let mut tables = vec![
            ConnectivityTable::new(),
            sample_table(),
            [(4, vec![]), (2, vec![])].into_iter().collect(),
            [(0, vec![1]), (7, vec![]), (1, vec![0])].into_iter().collect(),
            [(9, vec![8, 0]), (3, vec![9]), (6, vec![]), (0, vec![9, 9])]
                .into_iter()
                .collect(),
        ];

        // xorshift keeps the layouts reproducible across runs.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |bound: u64| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % bound) as usize
        };
        for _ in 0..32 {
            let mut table = ConnectivityTable::new();
            for _ in 0..next(6) {
                let owner = next(40);
                let partners: Vec<usize> = (0..next(5)).map(|_| next(40)).collect();
                table.extend_partners(owner, partners);
            }
            tables.push(table);
        }
        tables
    }

    #[test]
    fn parsing_an_offset_block_yields_shifted_table() {
        for table in table_corpus() {
            for offset in [0, 1, 3, 250] {
                let parsed = ConnectivityTable::parse_block(&table.to_block(offset)).unwrap();
                let expected: ConnectivityTable = table
                    .iter()
                    .filter(|(_, partners)| !partners.is_empty())
                    .map(|(owner, partners)| {
                        (
                            owner + offset,
                            partners.iter().map(|p| p + offset).collect(),
                        )
                    })
                    .collect();
                assert_eq!(parsed, expected, "table {:?} at offset {}", table, offset);
            }
        }
    }

    #[test]
    fn parse_block_skips_blank_lines() {
        let parsed = ConnectivityTable::parse_block("0 1\n\n1 0\n").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.partners(1), Some(&[0][..]));
    }

    #[test]
    fn parse_block_rejects_non_integer_tokens() {
        let err = ConnectivityTable::parse_block("0 1\n2 x").unwrap_err();
        assert_eq!(
            err,
            ConnectivityError::InvalidIndex {
                line: 2,
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn parse_block_rejects_negative_indices() {
        assert!(ConnectivityTable::parse_block("-1 0").is_err());
    }

    #[test]
    fn display_matches_offset_zero_block() {
        assert_eq!(sample_table().to_string(), "0 1 2\n1 0\n2 0");
    }
}
