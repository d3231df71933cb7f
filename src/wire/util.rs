use std::net::Ipv4Addr;

use super::Error::{self, InvalidSliceSize};

pub type Result<T> = std::result::Result<T, Error>;

/// Reads big-endian fields from the front of a received packet
pub struct Deserializer<'a>(&'a [u8]);

impl<'a> Deserializer<'a> {
    pub fn new(packet: &'a [u8]) -> Self {
        Self(packet)
    }

    pub fn advance(&mut self, by: usize) -> Result<&'a [u8]> {
        if self.0.len() < by {
            return Err(InvalidSliceSize(self.0.len(), by));
        }
        let (field, rest) = self.0.split_at(by);
        self.0 = rest;
        Ok(field)
    }

    pub fn deserialize<T: Deserialize>(&mut self) -> Result<T> {
        T::deserialize(self)
    }
}

pub trait Deserialize: Sized {
    fn deserialize(data: &mut Deserializer<'_>) -> Result<Self>;
}

impl<const S: usize> Deserialize for [u8; S] {
    fn deserialize(data: &mut Deserializer<'_>) -> Result<Self> {
        let mut array = [0; S];
        array.copy_from_slice(data.advance(S)?);
        Ok(array)
    }
}

impl Deserialize for u8 {
    fn deserialize(data: &mut Deserializer<'_>) -> Result<Self> {
        Ok(data.advance(1)?[0])
    }
}

impl Deserialize for u16 {
    fn deserialize(data: &mut Deserializer<'_>) -> Result<Self> {
        data.deserialize().map(u16::from_be_bytes)
    }
}

impl Deserialize for u32 {
    fn deserialize(data: &mut Deserializer<'_>) -> Result<Self> {
        data.deserialize().map(u32::from_be_bytes)
    }
}

impl Deserialize for Ipv4Addr {
    fn deserialize(data: &mut Deserializer<'_>) -> Result<Self> {
        data.deserialize().map(<[u8; 4]>::into)
    }
}

/// Writes big-endian fields one after the other into a fixed size packet
pub struct Serializer<const SIZE: usize> {
    buffer: [u8; SIZE],
    at: usize,
}

impl<const SIZE: usize> Serializer<SIZE> {
    pub fn new() -> Self {
        Self {
            buffer: [0; SIZE],
            at: 0,
        }
    }

    pub fn push(mut self, data: &[u8]) -> Result<Self> {
        let end = self.at + data.len();
        if end > SIZE {
            return Err(InvalidSliceSize(SIZE - self.at, data.len()));
        }
        self.buffer[self.at..end].copy_from_slice(data);
        self.at = end;
        Ok(self)
    }

    pub fn serialize<T: Serialize>(self, v: T) -> Result<Self> {
        v.serialize(self)
    }

    /// Returns the packet, failing if not all of it has been written
    pub fn finish(self) -> Result<[u8; SIZE]> {
        match self.at {
            at if at == SIZE => Ok(self.buffer),
            at => Err(InvalidSliceSize(at, SIZE)),
        }
    }
}

pub trait Serialize {
    fn serialize<const S: usize>(self, buffer: Serializer<S>) -> Result<Serializer<S>>;
}

impl<const SIZE: usize> Serialize for [u8; SIZE] {
    fn serialize<const S: usize>(self, buffer: Serializer<S>) -> Result<Serializer<S>> {
        buffer.push(&self)
    }
}

impl Serialize for u8 {
    fn serialize<const S: usize>(self, buffer: Serializer<S>) -> Result<Serializer<S>> {
        buffer.serialize([self])
    }
}

impl Serialize for u16 {
    fn serialize<const S: usize>(self, buffer: Serializer<S>) -> Result<Serializer<S>> {
        buffer.serialize(self.to_be_bytes())
    }
}

impl Serialize for u32 {
    fn serialize<const S: usize>(self, buffer: Serializer<S>) -> Result<Serializer<S>> {
        buffer.serialize(self.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_slices_are_rejected() {
        let mut de = Deserializer::new(&[0, 1, 2]);
        assert_eq!(de.deserialize::<u16>(), Ok(1));
        assert_eq!(de.deserialize::<u32>(), Err(InvalidSliceSize(1, 4)));
    }

    #[test]
    fn serializer_must_be_filled() {
        let partial = Serializer::<4>::new().serialize(7u16).unwrap();
        assert_eq!(partial.finish(), Err(InvalidSliceSize(2, 4)));

        let overflow = Serializer::<2>::new().serialize(7u32);
        assert!(matches!(overflow, Err(InvalidSliceSize(2, 4))));
    }
}
