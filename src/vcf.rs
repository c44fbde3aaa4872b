//! VCF variant input and typed INFO field access.

use std::io::BufRead;

use anyhow::{Context, Result};

use noodles::vcf;
use noodles::vcf::variant::record::info::field::{value::Array, Value};
use noodles::vcf::variant::record::{Ids as _, Info as _};

/// One decoded variant call, reduced to what insertion recovery needs.
#[derive(Debug, Clone)]
pub struct VariantRecord {
    /// First ID column entry, if any.
    pub id: Option<String>,
    pub chrom: String,
    /// 0-based breakpoint position.
    pub pos: u32,
    /// SVTYPE INFO value. Its absence is a fatal input error for the caller.
    pub sv_type: Option<String>,
    /// SVLEN INFO value. Absent means the reported size is unusable.
    pub sv_len: Option<i64>,
    /// RNAMES INFO value: names of the reads the caller deemed supporting.
    pub read_names: Vec<String>,
}

/// Streaming VCF input (plain or bgzip-compressed).
pub struct VariantInput {
    reader: vcf::io::Reader<Box<dyn BufRead>>,
    header: vcf::Header,
    record: vcf::Record,
}

impl VariantInput {
    pub fn open(path: &str) -> Result<Self> {
        let mut reader = vcf::io::reader::Builder::default()
            .build_from_path(path)
            .with_context(|| format!("Failed to open VCF {}", path))?;
        let header = reader
            .read_header()
            .with_context(|| format!("Failed to read VCF header from {}", path))?;
        Ok(VariantInput {
            reader,
            header,
            record: vcf::Record::default(),
        })
    }

    /// Length of a contig from the header's `##contig` lines, if declared.
    pub fn contig_length(&self, name: &str) -> Option<u32> {
        self.header
            .contigs()
            .get(name)
            .and_then(|contig| contig.length())
            .map(|len| len as u32)
    }

    /// Read and decode the next record; `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<VariantRecord>> {
        if self.reader.read_record(&mut self.record)? == 0 {
            return Ok(None);
        }

        let chrom = self.record.reference_sequence_name().to_string();
        let pos = match self.record.variant_start() {
            Some(p) => (p?.get() - 1) as u32, // 1-based to 0-based
            None => anyhow::bail!("VCF record on {} has no position", chrom),
        };
        let id = self.record.ids().iter().next().map(String::from);

        let info = self.record.info();
        let sv_type = info_string(&self.header, &info, "SVTYPE")?;
        let sv_len = info_integer(&self.header, &info, "SVLEN")?;
        let read_names = info_string_list(&self.header, &info, "RNAMES")?;

        Ok(Some(VariantRecord {
            id,
            chrom,
            pos,
            sv_type,
            sv_len,
            read_names,
        }))
    }
}

fn info_string(
    header: &vcf::Header,
    info: &vcf::record::Info<'_>,
    key: &str,
) -> Result<Option<String>> {
    match info.get(header, key) {
        None => Ok(None),
        Some(result) => match result? {
            Some(Value::String(s)) => Ok(Some(s.into_owned())),
            Some(Value::Array(Array::String(values))) => match values.iter().next() {
                Some(v) => Ok(v?.map(|s| s.into_owned())),
                None => Ok(None),
            },
            _ => Ok(None),
        },
    }
}

fn info_integer(
    header: &vcf::Header,
    info: &vcf::record::Info<'_>,
    key: &str,
) -> Result<Option<i64>> {
    match info.get(header, key) {
        None => Ok(None),
        Some(result) => match result? {
            Some(Value::Integer(n)) => Ok(Some(i64::from(n))),
            // Some callers type SVLEN as Number=.; take the first element
            Some(Value::Array(Array::Integer(values))) => match values.iter().next() {
                Some(v) => Ok(v?.map(i64::from)),
                None => Ok(None),
            },
            _ => Ok(None),
        },
    }
}

/// A list-valued string field: either a comma-joined scalar or a typed array,
/// depending on how the producing caller declared it.
fn info_string_list(
    header: &vcf::Header,
    info: &vcf::record::Info<'_>,
    key: &str,
) -> Result<Vec<String>> {
    match info.get(header, key) {
        None => Ok(Vec::new()),
        Some(result) => match result? {
            Some(Value::String(s)) => Ok(s
                .split(',')
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()),
            Some(Value::Array(Array::String(values))) => {
                let mut names = Vec::new();
                for v in values.iter() {
                    if let Some(s) = v? {
                        names.push(s.into_owned());
                    }
                }
                Ok(names)
            }
            _ => Ok(Vec::new()),
        },
    }
}
