use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
    proto::rr::{RData, Record, RecordType},
};

use super::DnsError;

/// Default per-query timeout.
pub const DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// One answer record, reduced to what the posture checks consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// TXT record, segments joined with a single space.
    Txt(String),
    Mx {
        preference: u16,
        exchange: String,
    },
    Tlsa,
}

/// Query seam used by the policy, MX and DANE lookups.
///
/// `Ok(vec![])` means a server answered without data (NOERROR or NXDOMAIN);
/// every other failure surfaces as a [`DnsError`].
pub trait DnsLookup {
    fn query(
        &self,
        name: &str,
        record_type: RecordType,
        dnssec: bool,
    ) -> impl Future<Output = Result<Vec<Answer>, DnsError>> + Send;
}

/// One nameserver of the walk.
trait ServerLookup {
    fn addr(&self) -> SocketAddr;

    fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        dnssec: bool,
    ) -> impl Future<Output = Result<Vec<Answer>, ResolveError>> + Send;
}

struct NameServer {
    addr: SocketAddr,
    plain: TokioAsyncResolver,
    validating: TokioAsyncResolver,
}

impl NameServer {
    fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            addr,
            plain: single_server(addr, timeout, false),
            validating: single_server(addr, timeout, true),
        }
    }
}

impl ServerLookup for NameServer {
    fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        dnssec: bool,
    ) -> Result<Vec<Answer>, ResolveError> {
        let resolver = if dnssec {
            &self.validating
        } else {
            &self.plain
        };
        let lookup = resolver.lookup(name, record_type).await?;
        Ok(collect_answers(lookup.record_iter()))
    }
}

/// Resolver walking the configured nameservers in order.
///
/// Each server gets its own single-server resolver so that the answer of
/// the first server that responds is final: a later server is only asked
/// when the previous one could not be reached at all.
pub struct DnsResolver {
    servers: Vec<NameServer>,
}

impl DnsResolver {
    /// Build from the operating system resolver configuration.
    pub fn from_system_conf(timeout: Duration) -> Result<Self, DnsError> {
        let (config, _opts) = trust_dns_resolver::system_conf::read_system_conf()
            .map_err(DnsError::resolver_init)?;
        let mut addrs: Vec<SocketAddr> = Vec::new();
        for server in config.name_servers() {
            if !addrs.contains(&server.socket_addr) {
                addrs.push(server.socket_addr);
            }
        }
        Self::from_addrs(addrs, timeout)
    }

    /// Build from an explicit list of nameserver addresses (port 53).
    pub fn from_ips(ips: &[IpAddr], timeout: Duration) -> Result<Self, DnsError> {
        let addrs = ips.iter().map(|ip| SocketAddr::new(*ip, 53)).collect();
        Self::from_addrs(addrs, timeout)
    }

    fn from_addrs(addrs: Vec<SocketAddr>, timeout: Duration) -> Result<Self, DnsError> {
        if addrs.is_empty() {
            return Err(DnsError::NoNameServers);
        }
        let servers = addrs
            .into_iter()
            .map(|addr| NameServer::new(addr, timeout))
            .collect();
        Ok(Self { servers })
    }

    pub fn server_addrs(&self) -> Vec<SocketAddr> {
        self.servers.iter().map(ServerLookup::addr).collect()
    }
}

impl DnsLookup for DnsResolver {
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
        dnssec: bool,
    ) -> Result<Vec<Answer>, DnsError> {
        walk(&self.servers, name, record_type, dnssec).await
    }
}

async fn walk<S: ServerLookup>(
    servers: &[S],
    name: &str,
    record_type: RecordType,
    dnssec: bool,
) -> Result<Vec<Answer>, DnsError> {
    for server in servers {
        let err = match server.lookup(name, record_type, dnssec).await {
            Ok(answers) => return Ok(answers),
            Err(err) => err,
        };
        match classify(&err) {
            Failure::Empty => return Ok(Vec::new()),
            Failure::Refused(code) => return Err(DnsError::server_failure(name, code)),
            Failure::Fatal => return Err(DnsError::query(name, err)),
            Failure::Unreachable => {
                tracing::debug!(
                    server = %server.addr(),
                    %name,
                    %record_type,
                    error = %err,
                    "nameserver unreachable, trying next"
                );
            }
        }
    }
    Err(DnsError::no_answer(name))
}

#[derive(Debug, PartialEq, Eq)]
enum Failure {
    Empty,
    Refused(ResponseCode),
    Unreachable,
    Fatal,
}

fn classify(err: &ResolveError) -> Failure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => classify_response(*response_code),
        ResolveErrorKind::Timeout
        | ResolveErrorKind::NoConnections
        | ResolveErrorKind::Io(_)
        | ResolveErrorKind::Proto(_) => Failure::Unreachable,
        _ => Failure::Fatal,
    }
}

/// A server answered without data: NOERROR/NXDOMAIN are plain absence,
/// any other code ends the walk as a failure.
fn classify_response(code: ResponseCode) -> Failure {
    match code {
        ResponseCode::NoError | ResponseCode::NXDomain => Failure::Empty,
        code => Failure::Refused(code),
    }
}

fn single_server(addr: SocketAddr, timeout: Duration, validate: bool) -> TokioAsyncResolver {
    let group = NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true);
    let config = ResolverConfig::from_parts(None, Vec::new(), group);

    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.ndots = 0;
    // payload size is the library default, not 4096
    opts.edns0 = true;
    opts.validate = validate;
    opts.use_hosts_file = false;

    TokioAsyncResolver::tokio(config, opts)
}

fn collect_answers<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<Answer> {
    let mut answers = Vec::new();
    for record in records {
        match record.data() {
            Some(RData::TXT(txt)) => {
                let joined = txt
                    .txt_data()
                    .iter()
                    .map(|piece| String::from_utf8_lossy(piece).into_owned())
                    .collect::<Vec<_>>()
                    .join(" ");
                answers.push(Answer::Txt(joined));
            }
            Some(RData::MX(mx)) => answers.push(Answer::Mx {
                preference: mx.preference(),
                exchange: mx.exchange().to_utf8(),
            }),
            _ if record.record_type() == RecordType::TLSA => answers.push(Answer::Tlsa),
            _ => {}
        }
    }
    answers
}

/// Normalize a user supplied domain to its ASCII, fully-qualified form.
pub fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    let ascii = idna::domain_to_ascii(trimmed).map_err(DnsError::idna)?;
    Ok(format!("{}.", ascii.to_ascii_lowercase()))
}

/// Prefix `domain` with `label`, keeping it fully qualified.
pub fn fqdn(label: &str, domain: &str) -> String {
    let domain = domain.trim_end_matches('.');
    let trimmed = label.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        format!("{domain}.")
    } else {
        format!("{}.{domain}.", trimmed.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use trust_dns_resolver::proto::rr::Name;
    use trust_dns_resolver::proto::rr::rdata::{MX, TXT};

    enum Reply {
        Answers(Vec<Answer>),
        Timeout,
        NoConnections,
        Io,
        Malformed,
    }

    struct FakeServer {
        addr: SocketAddr,
        reply: Reply,
        asked: AtomicUsize,
    }

    impl FakeServer {
        fn new(last_octet: u8, reply: Reply) -> Self {
            Self {
                addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, last_octet)), 53),
                reply,
                asked: AtomicUsize::new(0),
            }
        }

        fn asked(&self) -> usize {
            self.asked.load(Ordering::SeqCst)
        }
    }

    impl ServerLookup for FakeServer {
        fn addr(&self) -> SocketAddr {
            self.addr
        }

        async fn lookup(
            &self,
            _name: &str,
            _record_type: RecordType,
            _dnssec: bool,
        ) -> Result<Vec<Answer>, ResolveError> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Answers(answers) => Ok(answers.clone()),
                Reply::Timeout => Err(ResolveErrorKind::Timeout.into()),
                Reply::NoConnections => Err(ResolveErrorKind::NoConnections.into()),
                Reply::Io => Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )
                .into()),
                Reply::Malformed => Err(ResolveErrorKind::Message("malformed response").into()),
            }
        }
    }

    fn txt(text: &str) -> Reply {
        Reply::Answers(vec![Answer::Txt(text.to_string())])
    }

    #[tokio::test]
    async fn first_server_that_answers_is_final() {
        let servers = [FakeServer::new(1, txt("v=spf1 -all")), FakeServer::new(2, txt("other"))];

        let answers = walk(&servers, "example.gov.", RecordType::TXT, false)
            .await
            .expect("answer");

        assert_eq!(answers, vec![Answer::Txt("v=spf1 -all".to_string())]);
        assert_eq!(servers[1].asked(), 0);
    }

    #[tokio::test]
    async fn unreachable_servers_are_skipped_in_order() {
        let servers = [
            FakeServer::new(1, Reply::Timeout),
            FakeServer::new(2, Reply::Io),
            FakeServer::new(3, Reply::NoConnections),
            FakeServer::new(4, txt("v=DMARC1; p=none")),
        ];

        let answers = walk(&servers, "_dmarc.example.gov.", RecordType::TXT, false)
            .await
            .expect("fourth server answers");

        assert_eq!(answers.len(), 1);
        assert!(servers.iter().all(|server| server.asked() == 1));
    }

    #[tokio::test]
    async fn no_reachable_server_is_no_answer() {
        let servers = [FakeServer::new(1, Reply::Timeout), FakeServer::new(2, Reply::Timeout)];

        let err = walk(&servers, "example.gov.", RecordType::MX, false)
            .await
            .expect_err("nobody answered");

        assert!(matches!(err, DnsError::NoAnswer { .. }));
    }

    #[tokio::test]
    async fn non_transport_error_ends_the_walk() {
        let servers = [FakeServer::new(1, Reply::Malformed), FakeServer::new(2, txt("v=spf1"))];

        let err = walk(&servers, "example.gov.", RecordType::TXT, false)
            .await
            .expect_err("first server failed");

        assert!(matches!(err, DnsError::Query { .. }));
        assert_eq!(servers[1].asked(), 0);
    }

    #[test]
    fn empty_responses_are_absence_and_error_codes_are_failures() {
        assert_eq!(classify_response(ResponseCode::NoError), Failure::Empty);
        assert_eq!(classify_response(ResponseCode::NXDomain), Failure::Empty);
        assert_eq!(
            classify_response(ResponseCode::ServFail),
            Failure::Refused(ResponseCode::ServFail)
        );
        assert_eq!(
            classify_response(ResponseCode::Refused),
            Failure::Refused(ResponseCode::Refused)
        );
    }

    #[test]
    fn transport_errors_are_unreachable() {
        let timeout: ResolveError = ResolveErrorKind::Timeout.into();
        let io: ResolveError =
            std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out").into();
        let other: ResolveError = ResolveErrorKind::Message("bad").into();

        assert_eq!(classify(&timeout), Failure::Unreachable);
        assert_eq!(classify(&io), Failure::Unreachable);
        assert_eq!(classify(&other), Failure::Fatal);
    }

    #[test]
    fn txt_segments_are_joined_with_one_space() {
        let name = Name::from_ascii("example.gov.").expect("name");
        let records = vec![
            Record::from_rdata(
                name.clone(),
                300,
                RData::TXT(TXT::new(vec![
                    "v=spf1 include:_spf.example.gov".to_string(),
                    "-all".to_string(),
                ])),
            ),
            Record::from_rdata(
                name.clone(),
                300,
                RData::MX(MX::new(10, Name::from_ascii("Mail.example.gov.").expect("name"))),
            ),
            Record::from_rdata(name, 300, RData::A(Ipv4Addr::LOCALHOST.into())),
        ];

        let answers = collect_answers(&records);

        assert_eq!(
            answers,
            vec![
                Answer::Txt("v=spf1 include:_spf.example.gov -all".to_string()),
                Answer::Mx {
                    preference: 10,
                    exchange: "Mail.example.gov.".to_string(),
                },
            ]
        );
    }
}
