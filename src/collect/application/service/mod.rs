pub mod collector;
pub mod modeler;
pub mod normalizer;
pub mod plugin_parser;
pub mod process_scanner;
