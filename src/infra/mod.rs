pub mod artifact_output_adapter;
