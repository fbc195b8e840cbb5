//! Growable struct-of-arrays tables for atoms, residues, chains, and models.
//!
//! Every store keeps a logical row `count` that never exceeds its physical `capacity`.
//! Appending into a full store at least doubles the capacity, keeps existing rows in
//! place, and zero-fills the new tail, so row indices handed out earlier stay valid.
//! Columns are public `Vec`s; readers index them directly and are responsible for staying
//! below `count`.

use super::error::Error;
use super::types::Point;
use smol_str::SmolStr;
use std::fmt;

/// Smallest physical capacity a store grows to.
pub const MIN_CAPACITY: usize = 256;

/// Capacity a full store grows to.
pub fn grown_capacity(current: usize) -> usize {
    (current * 2).max(MIN_CAPACITY)
}

macro_rules! columnar_store {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
        $( extra $extra:ident : $extra_ty:ty )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            count: usize,
            length: usize,
            $( $(#[$fmeta])* pub $field: Vec<$ty>, )*
            $( pub $extra: $extra_ty, )?
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Creates a store with `length` pre-allocated, zeroed rows and a count of zero.
            pub fn with_capacity(length: usize) -> Self {
                let mut store = Self::default();
                store.resize(length);
                store
            }

            pub fn count(&self) -> usize {
                self.count
            }

            pub fn capacity(&self) -> usize {
                self.length
            }

            pub fn is_empty(&self) -> bool {
                self.count == 0
            }

            /// Sets the physical length of every column to exactly `length` rows.
            ///
            /// Existing rows below `length` are preserved; new rows are zero-filled. The
            /// logical count is clamped to the new length.
            pub fn resize(&mut self, length: usize) {
                $( self.$field.resize(length, Default::default()); )*
                $( self.$extra.resize(length); )?
                self.length = length;
                self.count = self.count.min(length);
            }

            /// Grows the store when every physical row is in use.
            pub fn grow_if_full(&mut self) {
                if self.count >= self.length {
                    self.resize(grown_capacity(self.length));
                }
            }

            /// Appends a zeroed row and returns its index.
            pub fn push_row(&mut self) -> usize {
                self.grow_if_full();
                let index = self.count;
                self.count += 1;
                index
            }
        }
    };
}

columnar_store! {
    /// One row per atom.
    ///
    /// `residue_index` is non-decreasing in append order during a build pass. Optional
    /// attributes such as partial charges live in [`AtomStore::extra`].
    AtomStore {
        x: f32,
        y: f32,
        z: f32,
        serial: i32,
        /// Id into the structure's [`AtomMap`](super::atom_map::AtomMap).
        atom_type_id: u32,
        residue_index: u32,
        bfactor: f32,
        occupancy: f32,
        /// Alternate location code; `0` or `b' '` mean "no alternate".
        altloc: u8,
    }
    extra extra: ExtraFields
}

columnar_store! {
    /// One row per residue, each owning a contiguous slice of the atom store.
    ResidueStore {
        /// Id into the structure's [`ResidueMap`](super::residue_map::ResidueMap).
        residue_type_id: u32,
        chain_index: u32,
        resno: i32,
        /// Insertion code; `0` when absent.
        inscode: u8,
        atom_offset: u32,
        atom_count: u32,
        /// Secondary-structure code, see [`SecondaryStructure`](super::types::SecondaryStructure).
        sstruc: u8,
    }
}

columnar_store! {
    /// One row per chain, each owning a contiguous slice of the residue store.
    ChainStore {
        /// Display name; may be auto-generated.
        chain_name: SmolStr,
        /// Structural label as written by the source format.
        chain_id: SmolStr,
        model_index: u32,
        residue_offset: u32,
        residue_count: u32,
        entity_index: u32,
    }
}

columnar_store! {
    /// One row per model (frame), each owning a contiguous slice of the chain store.
    ModelStore {
        chain_offset: u32,
        chain_count: u32,
    }
}

impl AtomStore {
    pub fn position(&self, index: usize) -> Point {
        Point::new(
            self.x[index] as f64,
            self.y[index] as f64,
            self.z[index] as f64,
        )
    }

    pub fn set_position(&mut self, index: usize, position: &Point) {
        self.x[index] = position.x as f32;
        self.y[index] = position.y as f32;
        self.z[index] = position.z as f32;
    }

    pub fn distance_squared(&self, i: usize, j: usize) -> f32 {
        let dx = self.x[i] - self.x[j];
        let dy = self.y[i] - self.y[j];
        let dz = self.z[i] - self.z[j];
        dx * dx + dy * dy + dz * dz
    }

    /// Declares an additional per-atom column.
    ///
    /// Must be called before any row that references the field is written; existing rows
    /// read as zero. Re-declaring a field with the same width and type is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldConflict`] when `name` exists with a different shape.
    pub fn add_field(
        &mut self,
        name: &str,
        width: usize,
        numeric_type: NumericType,
    ) -> Result<(), Error> {
        let rows = self.capacity();
        self.extra.add(name, width, numeric_type, rows)
    }

    pub fn extra_field(&self, name: &str) -> Option<&ExtraField> {
        self.extra.get(name)
    }

    /// Mutable access to a declared extra column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] when `name` was never declared.
    pub fn extra_field_mut(&mut self, name: &str) -> Result<&mut ExtraField, Error> {
        self.extra
            .get_mut(name)
            .ok_or_else(|| Error::unknown_field(name))
    }
}

impl ResidueStore {
    pub fn inscode_char(&self, index: usize) -> Option<char> {
        match self.inscode[index] {
            0 | b' ' => None,
            code => Some(code as char),
        }
    }
}

/// Element type of an extra per-row column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    F32,
    I32,
    U8,
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NumericType::F32 => "f32",
            NumericType::I32 => "i32",
            NumericType::U8 => "u8",
        };
        write!(f, "{}", name)
    }
}

/// Backing storage of an extra column, `width` values per row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    F32(Vec<f32>),
    I32(Vec<i32>),
    U8(Vec<u8>),
}

impl FieldData {
    fn zeroed(numeric_type: NumericType, len: usize) -> Self {
        match numeric_type {
            NumericType::F32 => FieldData::F32(vec![0.0; len]),
            NumericType::I32 => FieldData::I32(vec![0; len]),
            NumericType::U8 => FieldData::U8(vec![0; len]),
        }
    }

    pub fn numeric_type(&self) -> NumericType {
        match self {
            FieldData::F32(_) => NumericType::F32,
            FieldData::I32(_) => NumericType::I32,
            FieldData::U8(_) => NumericType::U8,
        }
    }

    fn resize(&mut self, len: usize) {
        match self {
            FieldData::F32(v) => v.resize(len, 0.0),
            FieldData::I32(v) => v.resize(len, 0),
            FieldData::U8(v) => v.resize(len, 0),
        }
    }
}

/// A named extra column.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraField {
    pub name: SmolStr,
    pub width: usize,
    pub data: FieldData,
}

impl ExtraField {
    pub fn numeric_type(&self) -> NumericType {
        self.data.numeric_type()
    }

    pub fn f32_row(&self, row: usize) -> Option<&[f32]> {
        match &self.data {
            FieldData::F32(v) => v.get(row * self.width..(row + 1) * self.width),
            _ => None,
        }
    }

    pub fn i32_row(&self, row: usize) -> Option<&[i32]> {
        match &self.data {
            FieldData::I32(v) => v.get(row * self.width..(row + 1) * self.width),
            _ => None,
        }
    }

    pub fn u8_row(&self, row: usize) -> Option<&[u8]> {
        match &self.data {
            FieldData::U8(v) => v.get(row * self.width..(row + 1) * self.width),
            _ => None,
        }
    }

    pub fn set_f32(&mut self, row: usize, values: &[f32]) {
        if let FieldData::F32(v) = &mut self.data {
            let start = row * self.width;
            v[start..start + self.width].copy_from_slice(&values[..self.width]);
        }
    }

    pub fn set_i32(&mut self, row: usize, values: &[i32]) {
        if let FieldData::I32(v) = &mut self.data {
            let start = row * self.width;
            v[start..start + self.width].copy_from_slice(&values[..self.width]);
        }
    }

    pub fn set_u8(&mut self, row: usize, values: &[u8]) {
        if let FieldData::U8(v) = &mut self.data {
            let start = row * self.width;
            v[start..start + self.width].copy_from_slice(&values[..self.width]);
        }
    }

    fn describe(&self) -> String {
        format!("{} x {}", self.width, self.numeric_type())
    }
}

/// Extra columns attached to a store after construction.
#[derive(Debug, Clone, Default)]
pub struct ExtraFields {
    fields: Vec<ExtraField>,
}

impl ExtraFields {
    fn add(
        &mut self,
        name: &str,
        width: usize,
        numeric_type: NumericType,
        rows: usize,
    ) -> Result<(), Error> {
        if let Some(existing) = self.get(name) {
            if existing.width == width && existing.numeric_type() == numeric_type {
                return Ok(());
            }
            return Err(Error::field_conflict(
                name,
                existing.describe(),
                format!("{} x {}", width, numeric_type),
            ));
        }

        self.fields.push(ExtraField {
            name: SmolStr::new(name),
            width,
            data: FieldData::zeroed(numeric_type, rows * width),
        });
        Ok(())
    }

    fn resize(&mut self, rows: usize) {
        for field in &mut self.fields {
            field.data.resize(rows * field.width);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExtraField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ExtraField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtraField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
