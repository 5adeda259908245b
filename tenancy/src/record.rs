use crate::{error::Error, ToCanonicalString};
use std::{fmt, fs::File, io::Read, path::Path};

///
/// The tenant attributes a CSV column can carry.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Idp,
    Organisation,
    Alias,
    Hostname,
    Country,
    Timezone,
    Language,
    Email,
    TermsAndConditions,
    Definite,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Idp                => "idp",
            Field::Organisation       => "organisation",
            Field::Alias              => "alias",
            Field::Hostname           => "hostname",
            Field::Country            => "country",
            Field::Timezone           => "timezone",
            Field::Language           => "language",
            Field::Email              => "email",
            Field::TermsAndConditions => "termsAndConditions",
            Field::Definite           => "definite",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct Column {
    name: &'static str,
    field: Option<Field>, // None for columns we carry but never read.
}

impl Column {
    const fn mapped(name: &'static str, field: Field) -> Self {
        Self { name, field: Some(field) }
    }

    const fn unmapped(name: &'static str) -> Self {
        Self { name, field: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

///
/// A fixed, ordered CSV layout. The header row of a file is discarded and these column names are
/// used instead.
///
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    columns: &'static [Column],
}

/// The layout shared by the landing-page and provisioning sheets.
pub static TENANTS: Schema = Schema {
    name: "tenants",
    columns: &[
        Column::mapped("idp", Field::Idp),
        Column::mapped("organisation", Field::Organisation),
        Column::mapped("alias", Field::Alias),
        Column::mapped("hostname", Field::Hostname),
        Column::mapped("country", Field::Country),
        Column::mapped("timezone", Field::Timezone),
        Column::mapped("language", Field::Language),
        Column::mapped("email", Field::Email),
        Column::mapped("termsAndConditions", Field::TermsAndConditions),
        Column::mapped("definite", Field::Definite),
    ]
};

/// The wider registry export, where the tenant alias carries a country code.
pub static REGISTRY: Schema = Schema {
    name: "registry",
    columns: &[
        Column::unmapped("id"),
        Column::mapped("idp", Field::Idp),
        Column::mapped("organisation", Field::Organisation),
        Column::unmapped("alias"),
        Column::mapped("alias with country code", Field::Alias),
        Column::mapped("tenant host name", Field::Hostname),
        Column::mapped("country", Field::Country),
        Column::mapped("timezone", Field::Timezone),
        Column::mapped("language", Field::Language),
        Column::mapped("email", Field::Email),
        Column::mapped("term and cons", Field::TermsAndConditions),
        Column::unmapped("logo"),
        Column::unmapped("landing page"),
    ]
};

impl Schema {
    ///
    /// Look up one of the known layouts by name.
    ///
    pub fn named(name: &str) -> Option<&'static Schema> {
        [&TENANTS, &REGISTRY].into_iter().find(|schema| schema.name == name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn position(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|col| col.field == Some(field))
    }
}

///
/// One row of a CSV file. Immutable once parsed.
///
#[derive(Clone, Debug)]
pub struct Record {
    line: u64,
    schema: &'static Schema,
    values: Vec<String>,
}

impl Record {
    fn new(line: u64, schema: &'static Schema, row: &csv::StringRecord) -> Self {
        Self {
            line,
            schema,
            values: row.iter().map(|value| value.trim().to_string()).collect(),
        }
    }

    /// The line in the source file this record was read from.
    pub fn line(&self) -> u64 {
        self.line
    }

    ///
    /// The value of the field, or None if the layout doesn't carry it or the cell is blank.
    ///
    pub fn get(&self, field: Field) -> Option<&str> {
        self.schema.position(field)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    ///
    /// Column name and value pairs in layout order.
    ///
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.schema.columns().iter()
            .zip(self.values.iter())
            .map(|(col, value)| (col.name(), value.as_str()))
    }

    ///
    /// The alias if present, otherwise a placeholder with the line number for logging.
    ///
    pub fn describe(&self) -> String {
        match self.get(Field::Alias) {
            Some(alias) => alias.to_string(),
            None => format!("<line {}>", self.line),
        }
    }
}

///
/// A lazy, finite sequence of records in file order.
///
pub struct Records<R> {
    origin: String,
    schema: &'static Schema,
    inner: csv::StringRecordsIntoIter<R>,
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;

        Some(match result {
            Ok(row) => {
                let line = row.position().map(|pos| pos.line()).unwrap_or_default();
                Ok(Record::new(line, self.schema, &row))
            },
            Err(source) => {
                let row = source.position().map(|pos| pos.line()).unwrap_or_default();
                Err(Error::CannotParseCsvRow { path: self.origin.clone(), row, source })
            },
        })
    }
}

///
/// Open the CSV file and return its records read with the schema's layout.
///
pub fn load_records(path: &Path, schema: &'static Schema) -> Result<Records<File>, Error> {
    let file = File::open(path)
        .map_err(|source| Error::CannotOpenCsv { path: path.to_canonical_string(), source: source.into() })?;

    read_records(file, &path.to_canonical_string(), schema)
}

///
/// Read records from any source. The origin is only used in error messages.
///
pub fn read_records<R: Read>(rdr: R, origin: &str, schema: &'static Schema) -> Result<Records<R>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(rdr);

    let found = reader.headers()
        .map_err(|source| Error::CannotParseCsvRow { path: origin.into(), row: 1, source })?
        .len();

    if found != schema.len() {
        return Err(Error::SchemaMismatch {
            path: origin.into(),
            schema: schema.name().into(),
            expected: schema.len(),
            found,
        })
    }

    log::debug!("Reading {} with the {} layout", origin, schema.name());

    Ok(Records { origin: origin.into(), schema, inner: reader.into_records() })
}

///
/// Load a single column list of tenant aliases. Only the first column of each row is used and blank
/// rows are ignored.
///
pub fn load_aliases(path: &Path) -> Result<Vec<String>, Error> {
    let file = File::open(path)
        .map_err(|source| Error::CannotOpenCsv { path: path.to_canonical_string(), source: source.into() })?;

    read_aliases(file, &path.to_canonical_string())
}

pub fn read_aliases<R: Read>(rdr: R, origin: &str) -> Result<Vec<String>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr);

    let mut aliases = vec!();
    for result in reader.records() {
        let row = result.map_err(|source| {
            let row = source.position().map(|pos| pos.line()).unwrap_or_default();
            Error::CannotParseCsvRow { path: origin.into(), row, source }
        })?;

        if let Some(alias) = row.get(0).map(str::trim).filter(|alias| !alias.is_empty()) {
            aliases.push(alias.to_string());
        }
    }

    Ok(aliases)
}
