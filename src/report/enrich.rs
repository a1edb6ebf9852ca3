use super::identity::Identity;
use super::period::DateRange;
use super::schema::Enrichment;
use crate::output::{OutputTable, OutputValue};

pub fn enrich(
    mut table: OutputTable,
    enrichment: &[Enrichment],
    identity: &Identity,
    range: &DateRange,
) -> OutputTable {
    for extra in enrichment {
        let value = match extra {
            Enrichment::Brand => OutputValue::Text(identity.brand.clone()),
            Enrichment::Indication => OutputValue::Text(identity.indication.clone()),
            Enrichment::ActivityStartMonth => OutputValue::Date(range.start()),
            Enrichment::ActivityEndMonth => OutputValue::Date(range.end()),
        };
        table.append_constant(extra.column(), value);
    }
    table
}
