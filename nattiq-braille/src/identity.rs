//! Active identification of the attached device

use nattiq_transport::TransportError;
use tracing::{debug, info, warn};

use crate::frame::{build_short_frame, Frame, ShortFrame};
use crate::profile::DeviceIdentity;
use crate::protocol::timing;
use crate::reader::FramedChannel;

/// Try each candidate in order and return the first the device confirms
///
/// A wildcard is accepted without any I/O. A transport error while probing
/// rejects only that candidate.
pub fn probe(link: &mut FramedChannel, candidates: &[DeviceIdentity]) -> Option<DeviceIdentity> {
    for candidate in candidates {
        if candidate.is_wildcard() {
            info!("assuming identity: {}", candidate.key_table);
            return Some(*candidate);
        }

        debug!(
            "testing identity: {} ({:02X}/{:02X})",
            candidate.key_table, candidate.id1, candidate.id2
        );
        match test_identity(link, candidate) {
            Ok(true) => {
                info!("confirmed identity: {}", candidate.key_table);
                return Some(*candidate);
            }
            Ok(false) => {}
            Err(e) => warn!("identity probe for {} failed: {}", candidate.key_table, e),
        }
    }
    None
}

/// Send one probe and wait for its echo
///
/// Long frames arriving meanwhile are ignored. The first short frame
/// decides: it must repeat the probe exactly.
fn test_identity(
    link: &mut FramedChannel,
    candidate: &DeviceIdentity,
) -> Result<bool, TransportError> {
    let expected = ShortFrame::new(candidate.id1, candidate.id2);
    link.write(&build_short_frame(candidate.id1, candidate.id2))?;

    loop {
        match link.read_frame(timing::IDENTITY_READ_TIMEOUT)? {
            None => return Ok(false),
            Some(Frame::Short(echo)) => return Ok(echo == expected),
            Some(Frame::Long(frame)) => debug!("ignoring frame while probing: {}", Frame::Long(frame)),
        }
    }
}
