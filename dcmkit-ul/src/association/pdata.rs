//! Fragmenting a DIMSE command or data set across as many P-DATA-TF PDUs
//! as its size requires.

use std::io::{self, Read, Write};

use crate::association::Association;
use crate::error::Result;
use crate::pdu::{PDataValue, PDataValueType, Pdu};

/// Given the maximum PDU length a peer will accept, the largest payload
/// a single PDV item can carry: the PDU header's 6 bytes are already
/// excluded from `pdu_len` (it is the negotiated "max PDU length" user
/// item value), so only the PDV item's own overhead is subtracted — a
/// 4-byte item length field and the 2-byte context id/control-byte
/// pair.
pub fn calculate_max_data_len_single(pdu_len: u32) -> u32 {
    pdu_len.saturating_sub(4).saturating_sub(2)
}

/// A [`Write`] implementer that buffers a DIMSE command or data set and
/// splits it into PDV items no larger than the peer's negotiated PDU
/// size, sending one or more P-DATA-TF PDUs as needed.
///
/// The final fragment must be flagged `is_last`; since a `Write`'s
/// caller has no "this is the end" signal of its own, callers must call
/// [`PDataWriter::finish`] explicitly. Dropping without finishing still
/// flushes what was buffered, marked as the last fragment, so a stray
/// drop cannot desynchronize the PDV stream — but its result is only
/// logged, not surfaced.
pub struct PDataWriter<'a, S> {
    association: &'a mut Association<S>,
    presentation_context_id: u8,
    value_type: PDataValueType,
    max_data_len: usize,
    buffer: Vec<u8>,
    finished: bool,
}

impl<'a, S: Read + Write> PDataWriter<'a, S> {
    pub(crate) fn new(association: &'a mut Association<S>, presentation_context_id: u8, value_type: PDataValueType) -> Self {
        let max_data_len = calculate_max_data_len_single(association.peer_max_pdu_length()) as usize;
        PDataWriter {
            association,
            presentation_context_id,
            value_type,
            max_data_len: max_data_len.max(1),
            buffer: Vec::new(),
            finished: false,
        }
    }

    fn send_chunk(&mut self, chunk: Vec<u8>, is_last: bool) -> Result<()> {
        self.association.send_pdu(&Pdu::PData {
            data: vec![PDataValue {
                presentation_context_id: self.presentation_context_id,
                data: chunk,
                value_type: self.value_type,
                is_last,
            }],
        })
    }

    fn flush_full_chunks(&mut self) -> Result<()> {
        while self.buffer.len() > self.max_data_len {
            let chunk: Vec<u8> = self.buffer.drain(..self.max_data_len).collect();
            self.send_chunk(chunk, false)?;
        }
        Ok(())
    }

    /// Send whatever remains buffered as the final fragment.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush_full_chunks()?;
        let remainder = std::mem::take(&mut self.buffer);
        self.send_chunk(remainder, true)
    }
}

impl<'a, S: Read + Write> Write for PDataWriter<'a, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.flush_full_chunks()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a, S> Drop for PDataWriter<'a, S> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("PDataWriter dropped without finish(); last fragment was not sent");
        }
    }
}

/// Read a complete DIMSE command set (or command-set-sized portion of a
/// data set) out of one or more P-DATA-TF PDUs on the same presentation
/// context and value type, stopping at the first fragment flagged
/// `is_last`.
pub fn read_dimse_fragments<S: Read + Write>(
    association: &mut Association<S>,
    expected_type: PDataValueType,
) -> Result<(u8, Vec<u8>)> {
    let mut buffer = Vec::new();
    let mut context_id = None;
    loop {
        match association.receive_pdu()? {
            Pdu::PData { data } => {
                for pdv in data {
                    if context_id.is_none() {
                        context_id = Some(pdv.presentation_context_id);
                    }
                    debug_assert_eq!(pdv.value_type, expected_type, "interleaved command/data PDVs are not supported");
                    let is_last = pdv.is_last;
                    buffer.extend_from_slice(&pdv.data);
                    if is_last {
                        let id = context_id.unwrap_or(pdv.presentation_context_id);
                        return Ok((id, buffer));
                    }
                }
            }
            Pdu::Abort { source } => {
                return Err(crate::error::Error::AssociationAborted { source });
            }
            _ => {
                return Err(crate::error::Error::UnexpectedPdu {
                    context: "awaiting P-DATA-TF",
                })
            }
        }
    }
}
