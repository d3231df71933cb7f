use std::time::Duration;

/// The NAT-PMP `Seconds Since Start of Epoch` field
///
/// Every response carries the number of seconds elapsed since the gateway
/// (re)initialized its mapping table. A client that sees this value go
/// backwards, or advance noticeably slower than its own clock, knows the
/// gateway lost its mappings.
///
/// The check is described in [Section 3.6 of RFC6886].
///
/// [Section 3.6 of RFC6886]: https://www.rfc-editor.org/rfc/rfc6886.html#section-3.6
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Epoch(pub u32);

impl Epoch {
    /// Validate the new [`Epoch`] according to the `previous` one and the time `elapsed`
    /// on the client since it was received
    pub fn validate_epoch(&self, previous: Epoch, elapsed: Duration) -> bool {
        // RFC 6886, Section 3.6:
        // > When a client receives a response, it computes its own conservative
        // > estimate of the expected SSSoE value by taking the SSSoE value in
        // > the last packet it received from the gateway and adding 7/8 (87.5%)
        // > of the time elapsed according to the client's local clock since
        // > that packet was received. If the SSSoE in the newly received packet
        // > is less than the client's conservative estimate by more than 2
        // > seconds, then the client concludes that the NAT gateway has
        // > undergone a reboot or other loss of port mapping state
        let client_delta = elapsed.as_secs().saturating_mul(7) / 8;
        let expected = u64::from(previous.0).saturating_add(client_delta);
        u64::from(self.0) + 2 >= expected
    }
}
