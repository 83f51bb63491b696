// src/commands/factory.rs
use super::{
    AlgorithmPolicy, DataSource, DecryptCommand, DecryptOptions, DeriveKeyCommand,
    DeriveKeyOptions, EncryptCommand, EncryptOptions, ExportCommand, GenerateKeyCommand,
    GenerateKeyOptions, HashCommand, HashOptions, ImportCommand, VerifyHashCommand,
};
use crate::enums::ExportEncoding;
use crate::services::CryptoServices;

/// Builds commands with storage, logger and config already injected
#[derive(Clone)]
pub struct CommandFactory {
    services: CryptoServices,
    algorithms: AlgorithmPolicy,
}

impl CommandFactory {
    pub fn new(services: CryptoServices) -> Self {
        Self {
            services,
            algorithms: AlgorithmPolicy::default(),
        }
    }

    /// Restrict the cipher algorithms Encrypt and Decrypt accept
    pub fn with_algorithms(mut self, algorithms: AlgorithmPolicy) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn services(&self) -> &CryptoServices {
        &self.services
    }

    pub fn algorithms(&self) -> AlgorithmPolicy {
        self.algorithms
    }

    pub fn encrypt(
        &self,
        plaintext: DataSource,
        key_id: impl Into<String>,
        options: EncryptOptions,
    ) -> EncryptCommand {
        EncryptCommand::new(self.services.clone(), self.algorithms, plaintext, key_id, options)
    }

    pub fn decrypt(&self, envelope_id: impl Into<String>, options: DecryptOptions) -> DecryptCommand {
        DecryptCommand::new(self.services.clone(), self.algorithms, envelope_id, options)
    }

    pub fn hash(&self, data: DataSource, options: HashOptions) -> HashCommand {
        HashCommand::new(self.services.clone(), data, options)
    }

    pub fn verify_hash(
        &self,
        data: DataSource,
        expected: impl Into<Vec<u8>>,
        options: HashOptions,
    ) -> VerifyHashCommand {
        VerifyHashCommand::new(self.services.clone(), data, expected, options)
    }

    pub fn derive_key(
        &self,
        source_key_id: impl Into<String>,
        options: DeriveKeyOptions,
    ) -> DeriveKeyCommand {
        DeriveKeyCommand::new(self.services.clone(), source_key_id, options)
    }

    pub fn generate_key(&self, options: GenerateKeyOptions) -> GenerateKeyCommand {
        GenerateKeyCommand::new(self.services.clone(), options)
    }

    pub fn import(&self, data: Vec<u8>, identifier: Option<String>) -> ImportCommand {
        ImportCommand::new(self.services.clone(), data, identifier)
    }

    pub fn export(&self, identifier: impl Into<String>, encoding: ExportEncoding) -> ExportCommand {
        ExportCommand::new(self.services.clone(), identifier, encoding)
    }
}
