//! Register-file I2C device for driver tests

use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, Operation};
use heapless::Vec;

pub type Frame = Vec<u8, 80>;

pub struct MockI2c {
    /// Every write, with its address
    pub writes: Vec<(u8, Frame), 128>,
    pub registers: [u8; 0x13],
    pointer: usize,
    /// Fail the n-th transaction
    pub fail_at: Option<usize>,
    transactions: usize,
}

impl MockI2c {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            registers: [0; 0x13],
            pointer: 0,
            fail_at: None,
            transactions: 0,
        }
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let index = self.transactions;
        self.transactions += 1;
        if self.fail_at == Some(index) {
            return Err(ErrorKind::Other);
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let frame = Frame::from_slice(bytes).map_err(|_| ErrorKind::Overrun)?;
                    self.writes
                        .push((address, frame))
                        .map_err(|_| ErrorKind::Overrun)?;
                    if let Some((&register, data)) = bytes.split_first() {
                        self.pointer = register as usize;
                        for (i, &b) in data.iter().enumerate() {
                            if let Some(slot) = self.registers.get_mut(self.pointer + i) {
                                *slot = b;
                            }
                        }
                    }
                }
                Operation::Read(buffer) => {
                    for (i, b) in buffer.iter_mut().enumerate() {
                        *b = self.registers.get(self.pointer + i).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}
