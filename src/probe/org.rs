/// Cache key grouping exchanges run by the same operator.
///
/// Hosts with fewer than three labels are their own key; longer names keep
/// their last two labels (`smtp.mailprovider.com` → `mailprovider.com`).
/// A trailing dot is ignored.
pub fn organizational_domain(host: &str) -> &str {
    let host = host.trim_end_matches('.');
    let labels = host.split('.').count();
    if labels < 3 {
        return host;
    }
    let mut dots = host.rmatch_indices('.').map(|(index, _)| index);
    match dots.nth(1) {
        Some(index) => &host[index + 1..],
        None => host,
    }
}
