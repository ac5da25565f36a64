// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Encoder.

use core::fmt;

use crate::{
    fountain,
    ur::{is_ur_type, UR},
};

/// An encoder.
#[cfg(feature = "alloc")]
pub type Encoder<'a, 'b> = BaseEncoder<'a, 'b, fountain::encoder::Alloc>;

#[cfg(feature = "alloc")]
impl<'a, 'b> Encoder<'a, 'b> {
    /// Construct a new [`Encoder`].
    pub const fn new() -> Self {
        Self {
            fountain: fountain::encoder::Encoder::new(),
            ur_type: None,
            message: None,
        }
    }
}

/// A static encoder.
///
/// Does not allocate memory.
pub type HeaplessEncoder<'a, 'b, const MAX_FRAGMENT_LEN: usize, const MAX_SEQUENCE_COUNT: usize> =
    BaseEncoder<'a, 'b, fountain::encoder::Heapless<MAX_FRAGMENT_LEN, MAX_SEQUENCE_COUNT>>;

impl<'a, 'b, const MAX_FRAGMENT_LEN: usize, const MAX_SEQUENCE_COUNT: usize>
    HeaplessEncoder<'a, 'b, MAX_FRAGMENT_LEN, MAX_SEQUENCE_COUNT>
{
    /// Construct a new [`HeaplessEncoder`].
    pub const fn new() -> Self {
        Self {
            fountain: fountain::encoder::HeaplessEncoder::new(),
            ur_type: None,
            message: None,
        }
    }
}

/// A uniform resource encoder with an underlying fountain encoding.
///
/// A message that fits a single fragment is emitted as one part without
/// the fountain framing; everything else becomes an unbounded stream of
/// fountain parts.
///
/// # Examples
///
/// See the [`crate`] documentation for an example.
pub struct BaseEncoder<'a, 'b, T: fountain::encoder::Types> {
    ur_type: Option<&'a str>,
    message: Option<&'b [u8]>,
    fountain: fountain::encoder::BaseEncoder<'b, T>,
}

impl<'a, 'b, T: fountain::encoder::Types> BaseEncoder<'a, 'b, T> {
    /// Start encoding a new message with the default minimum fragment
    /// length and a first sequence number of zero.
    ///
    /// # Errors
    ///
    /// See [`start_with`](Self::start_with).
    pub fn start(
        &mut self,
        ur_type: &'a str,
        message: &'b [u8],
        max_fragment_length: usize,
    ) -> Result<(), Error> {
        self.start_with(
            ur_type,
            message,
            max_fragment_length,
            0,
            fountain::encoder::DEFAULT_MIN_FRAGMENT_LENGTH,
        )
    }

    /// Start encoding a new message.
    ///
    /// The emitted fountain parts will respect the maximum fragment
    /// length argument.
    ///
    /// # Errors
    ///
    /// This function returns an error if `ur_type` does not satisfy the
    /// type tag grammar, if `message` is empty, or if no fragment length
    /// satisfies the length constraints.
    pub fn start_with(
        &mut self,
        ur_type: &'a str,
        message: &'b [u8],
        max_fragment_length: usize,
        first_sequence: u32,
        min_fragment_length: usize,
    ) -> Result<(), Error> {
        if !is_ur_type(ur_type) {
            return Err(Error::InvalidType);
        }

        self.fountain
            .start_with(message, max_fragment_length, first_sequence, min_fragment_length)?;
        self.ur_type = Some(ur_type);
        self.message = Some(message);

        Ok(())
    }

    /// Returns the current count of already emitted parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use ur::Encoder;
    ///
    /// let mut encoder = Encoder::new();
    /// encoder.start_with("bytes", "data".as_bytes(), 3, 0, 1).unwrap();
    ///
    /// assert_eq!(encoder.current_sequence(), 0);
    /// encoder.next_part();
    /// assert_eq!(encoder.current_sequence(), 1);
    /// ```
    #[inline]
    pub fn current_sequence(&self) -> u32 {
        self.fountain.current_sequence()
    }

    /// Returns the number of segments the original message has been split
    /// up into.
    ///
    /// # Examples
    ///
    /// ```
    /// use ur::Encoder;
    ///
    /// let mut encoder = Encoder::new();
    /// encoder.start_with("bytes", "data".as_bytes(), 3, 0, 1).unwrap();
    /// assert_eq!(encoder.sequence_count(), 2);
    /// ```
    ///
    /// # Panics
    ///
    /// This function panics if the encoder hasn't been started.
    #[inline]
    pub fn sequence_count(&self) -> u32 {
        self.fountain.sequence_count()
    }

    /// Returns `true` if the message fits a single part.
    ///
    /// A single-part resource carries the payload directly, without the
    /// fountain framing or a sequence path component.
    ///
    /// # Panics
    ///
    /// This function panics if the encoder hasn't been started.
    #[inline]
    pub fn is_single_part(&self) -> bool {
        self.sequence_count() == 1
    }

    /// Returns whether all original segments have been emitted at least
    /// once.
    ///
    /// # Panics
    ///
    /// This function panics if the encoder hasn't been started.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.fountain.is_complete()
    }

    /// Returns the URI corresponding to the next part.
    ///
    /// For a single-part message this is the same URI every time; for a
    /// multi-part message it is the next fountain part.
    ///
    /// # Examples
    ///
    /// See the [`crate`] documentation for an example.
    ///
    /// # Panics
    ///
    /// This function panics if the encoder hasn't been started.
    pub fn next_part(&mut self) -> UR {
        let ur_type = self.ur_type.expect("encoder is not started");

        if self.is_single_part() {
            UR::SinglePartDeserialized {
                ur_type,
                message: self.message.expect("encoder is not started"),
            }
        } else {
            UR::MultiPartDeserialized {
                ur_type,
                fragment: self.fountain.next_part(),
            }
        }
    }
}

/// Errors that can happen when starting an encoder.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The type tag violates the grammar.
    InvalidType,
    /// Fountain encoder error.
    Fountain(fountain::encoder::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidType => write!(f, "The Uniform Resource type is invalid"),
            Error::Fountain(e) => write!(f, "Fountain encoding error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<fountain::encoder::Error> for Error {
    fn from(e: fountain::encoder::Error) -> Self {
        Self::Fountain(e)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::ur::tests::make_message_ur;

    #[test]
    fn test_ur_encoder() {
        const TEST_VECTORS: &[&str] = &[
            "UR:BYTES/1-9/LPADASCFADAXCYWENBPLJKHDCAHKADAEMEJTSWHHYLKEPMYKHHTSYTSNOYOYAXAEDSUTTYDMMHHPKTPMSRJTDKGSLPGH",
            "UR:BYTES/2-9/LPAOASCFADAXCYWENBPLJKHDCAGWDPFNSBOXGWLBAAWZUEFYWKDPLRSRJYNBVYGABWJLDAPFCSGMGHHKHSTLRDCXAEFZ",
            "UR:BYTES/3-9/LPAXASCFADAXCYWENBPLJKHDCAHELBKNLKUEJNBADMSSFHFRDPSBIEGECPASVSSOVLGEYKSSJYKKLRONVSJKSOPDZMOL",
            "UR:BYTES/4-9/LPAAASCFADAXCYWENBPLJKHDCASOTKHEMTHYDAWYDTAXNEURLKOSGWCEKONERTKBRLWMPLSSJTAMMDPLOLSBRDZCRTAS",
            "UR:BYTES/5-9/LPAHASCFADAXCYWENBPLJKHDCATBBDFMSSRKZMCWNEZELENNJPFZBGMUKTRHTEJSCKTELGFPDLRKFYFWDAJLDEJOKBWF",
            "UR:BYTES/6-9/LPAMASCFADAXCYWENBPLJKHDCACKJLHKHYBSSKLBWEFECTPFNBBECTRLJECTPAVYROLKZCZCPKMWIDMWOXKILGHDSOWP",
            "UR:BYTES/7-9/LPATASCFADAXCYWENBPLJKHDCAVSZMWNJKWTCLRTVAYNHPAHRTOXMWVWATMEDIBKAEGDOSFTVANDIODAGDHTHTRLNNHY",
            "UR:BYTES/8-9/LPAYASCFADAXCYWENBPLJKHDCADMSPONKKBBHGSOLTJNTEGEPMTTMOONFTNBUOIYREHFRTSABZSTTORODKLUBBUYAETK",
            "UR:BYTES/9-9/LPASASCFADAXCYWENBPLJKHDCAJSKECPMDCKIHDYHPHFOTJOJTFMLNWMADSPAXRKYTBZTPBAUOTBGTGTAEAEVTGAVTNY",
            "UR:BYTES/10-9/LPBKASCFADAXCYWENBPLJKHDCAHKADAEMEJTSWHHYLKEPMYKHHTSYTSNOYOYAXAEDSUTTYDMMHHPKTPMSRJTWDKIPLZS",
            "UR:BYTES/11-9/LPBDASCFADAXCYWENBPLJKHDCAHELBKNLKUEJNBADMSSFHFRDPSBIEGECPASVSSOVLGEYKSSJYKKLRONVSJKVETIIAPK",
            "UR:BYTES/12-9/LPBNASCFADAXCYWENBPLJKHDCARLLALUZMDMGSTOSPEYIEFMWEJLWTPEDAMKTKSRVLCYGMZEMOVOVLLARODTMTBNPTRS",
            "UR:BYTES/13-9/LPBTASCFADAXCYWENBPLJKHDCAMTKGTPKNGHCHCHYKETWSVWGWFDHPGMGTYLCTOTZOPDRPAYOSCHCMHPLFFZIACHRFGD",
            "UR:BYTES/14-9/LPBAASCFADAXCYWENBPLJKHDCAPAZEWNVONNVDNSBYLEYNWTNSJKJNDEOLDYDKBKDSLGJKBBKORTBELOMUEEKGVSTEGT",
            "UR:BYTES/15-9/LPBSASCFADAXCYWENBPLJKHDCAYNMHPDDPZMVERSBDQDFYREHNQZLUGMJZMNMTWMROUOHTSTGSBSAHPAWKDITKCKYNWT",
            "UR:BYTES/16-9/LPBEASCFADAXCYWENBPLJKHDCAWYGEKOBAMWTLIHSNPALNSGHENSKKIYNTHDZOTSIMTOJETPRSTTMUKIRLRSBTAMJTPD",
            "UR:BYTES/17-9/LPBYASCFADAXCYWENBPLJKHDCAMKLGFTAXYKPEWYRTQZHYDNTPNYTYISINCXMHTBCEAYKOLDUORTOTIAIAIAFHIAOYCE",
            "UR:BYTES/18-9/LPBGASCFADAXCYWENBPLJKHDCAHKADAEMEJTSWHHYLKEPMYKHHTSYTSNOYOYAXAEDSUTTYDMMHHPKTPMSRJTNTWKBKWY",
            "UR:BYTES/19-9/LPBWASCFADAXCYWENBPLJKHDCADEKICPAAJOOTJZPSDRBALPEYWLLBDSNBINAERKURSPBNCXGSLGFTVTSRJTKSPLCPEO",
            "UR:BYTES/20-9/LPBBASCFADAXCYWENBPLJKHDCAYAPMRLEELEAXPASFRTRDKNCFFWJYJZGYETDMLEWTKPKTGLLEPFRLTATAZTKSMHKBOT",
        ];

        let ur = make_message_ur(256, "Wolf");

        fn test<'a, T: fountain::encoder::Types>(
            encoder: &mut BaseEncoder<'static, 'a, T>,
            ur: &'a [u8],
        ) {
            encoder.start("bytes", ur, 30).unwrap();
            assert_eq!(encoder.sequence_count(), 9);
            assert!(!encoder.is_single_part());
            for (index, &part) in TEST_VECTORS.iter().enumerate() {
                assert_eq!(encoder.current_sequence(), index.try_into().unwrap());
                assert_eq!(encoder.next_part().to_string(), part);
            }
        }

        let mut heapless_encoder: HeaplessEncoder<'_, '_, 30, 16> = HeaplessEncoder::new();
        let mut encoder = Encoder::new();

        test(&mut heapless_encoder, &ur);
        test(&mut encoder, &ur);
    }

    #[test]
    fn test_ur_encoder_single_part() {
        let message = make_message_ur(50, "Wolf");
        let mut encoder = Encoder::new();
        encoder.start("bytes", &message, 100).unwrap();

        assert!(encoder.is_single_part());
        assert_eq!(encoder.sequence_count(), 1);

        // A single-part resource has no sequence component and is stable
        // over repeated emission.
        let part = encoder.next_part().to_string();
        assert_eq!(part, crate::ur::to_string("bytes", &message));
        assert!(part.starts_with("UR:BYTES/"));
        assert_eq!(part.matches('/').count(), 1);
        assert_eq!(encoder.next_part().to_string(), part);
    }

    #[test]
    fn test_ur_encoder_invalid_type() {
        let mut encoder = Encoder::new();
        assert_eq!(
            encoder.start("-bytes", b"data", 10),
            Err(Error::InvalidType)
        );
        assert_eq!(
            encoder.start("by tes", b"data", 10),
            Err(Error::InvalidType)
        );
    }
}
