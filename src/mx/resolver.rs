use trust_dns_resolver::proto::rr::RecordType;

use super::{MxList, MxRecord};
use crate::dns::{Answer, DnsLookup};

/// Enumerate the mail exchanges of `domain` in resolver answer order.
///
/// The answer section is not sorted by preference; see [`MxList::primary`]
/// for choosing an exchange by preference instead.
pub async fn list_mx<L>(lookup: &L, domain: &str) -> MxList
where
    L: DnsLookup,
{
    let answers = match lookup.query(domain, RecordType::MX, false).await {
        Ok(answers) => answers,
        Err(err) => {
            tracing::warn!(%domain, error = %err, "MX lookup failed");
            return MxList::QueryFailed(err.to_string());
        }
    };

    let records: Vec<MxRecord> = answers
        .into_iter()
        .filter_map(|answer| match answer {
            Answer::Mx {
                preference,
                exchange,
            } => {
                let exchange = normalize_exchange(&exchange);
                // null MX (RFC 7505): the domain accepts no mail
                if exchange.is_empty() {
                    tracing::debug!(%domain, "null MX published");
                    return None;
                }
                Some(MxRecord::new(preference, exchange))
            }
            _ => None,
        })
        .collect();

    if records.is_empty() {
        MxList::NoRecords
    } else {
        MxList::Records(records)
    }
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
