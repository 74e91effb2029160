//! Build script for gpucopy
//!
//! Compiles the CUDA copy kernels to PTX when the cuda feature is enabled.
//!
//! # Requirements
//!
//! - CUDA Toolkit (nvcc compiler)
//! - Compute Capability 7.5+ by default (Turing, sm_75)
//!
//! # Environment Variables
//!
//! - `CUDA_PATH`: Custom CUDA installation path (optional)
//! - `GPUCOPY_CUDA_ARCH`: Target architecture passed to nvcc (default `sm_75`)
//!
//! # Troubleshooting
//!
//! If nvcc is not found:
//! 1. Install CUDA Toolkit from https://developer.nvidia.com/cuda-downloads
//! 2. Ensure nvcc is in your PATH, or set CUDA_PATH environment variable
//! 3. Common paths: /usr/local/cuda, /opt/cuda

fn main() {
    #[cfg(feature = "cuda")]
    compile_cuda_kernels();
}

#[cfg(feature = "cuda")]
const KERNEL_FILES: &[&str] = &["memcpy.cu"];

#[cfg(feature = "cuda")]
const DEFAULT_ARCH: &str = "sm_75";

#[cfg(feature = "cuda")]
fn compile_cuda_kernels() {
    use std::env;
    use std::path::PathBuf;
    use std::process::Command;

    println!("cargo:rerun-if-env-changed=CUDA_PATH");
    println!("cargo:rerun-if-env-changed=GPUCOPY_CUDA_ARCH");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let kernels_dir = PathBuf::from("src/runtime/cuda/kernels");
    let arch = env::var("GPUCOPY_CUDA_ARCH").unwrap_or_else(|_| DEFAULT_ARCH.to_string());

    let nvcc = find_nvcc().unwrap_or_else(|| {
        eprintln!();
        eprintln!("=== CUDA COMPILATION ERROR ===");
        eprintln!();
        eprintln!("Could not find nvcc (NVIDIA CUDA Compiler).");
        eprintln!();
        eprintln!("To fix this:");
        eprintln!("  1. Install CUDA Toolkit: https://developer.nvidia.com/cuda-downloads");
        eprintln!("  2. Add nvcc to your PATH, or set CUDA_PATH environment variable");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  export CUDA_PATH=/usr/local/cuda");
        eprintln!();
        panic!("nvcc not found - CUDA Toolkit must be installed for the 'cuda' feature");
    });

    for kernel_file in KERNEL_FILES {
        let cu_path = kernels_dir.join(kernel_file);
        let ptx_path = out_dir.join(kernel_file.replace(".cu", ".ptx"));

        println!("cargo:rerun-if-changed={}", cu_path.display());

        if !cu_path.exists() {
            panic!(
                "CUDA kernel source not found: {}\n\
                 Ensure kernel files exist in src/runtime/cuda/kernels/",
                cu_path.display()
            );
        }

        let output = Command::new(&nvcc)
            .arg("-ptx")
            .arg("-O3")
            .arg(format!("-arch={}", arch))
            .arg("-o")
            .arg(&ptx_path)
            .arg(&cu_path)
            .output();

        match output {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stdout = String::from_utf8_lossy(&output.stdout);
                eprintln!();
                eprintln!("=== CUDA COMPILATION FAILED ===");
                eprintln!();
                eprintln!("Failed to compile: {} (arch {})", kernel_file, arch);
                if !stdout.is_empty() {
                    eprintln!("stdout:");
                    eprintln!("{}", stdout);
                }
                if !stderr.is_empty() {
                    eprintln!("stderr:");
                    eprintln!("{}", stderr);
                }
                eprintln!();
                panic!("nvcc compilation failed for {}", kernel_file);
            }
            Err(e) => {
                eprintln!();
                eprintln!("=== NVCC EXECUTION ERROR ===");
                eprintln!();
                eprintln!("Failed to execute nvcc: {}", e);
                eprintln!("nvcc path: {}", nvcc);
                panic!("Failed to execute nvcc: {}", e);
            }
        }
    }

    // PTX directory for the kernel loader
    println!("cargo:rustc-env=CUDA_KERNEL_DIR={}", out_dir.display());
}

#[cfg(feature = "cuda")]
fn find_nvcc() -> Option<String> {
    use std::env;
    use std::path::{Path, PathBuf};
    use std::process::Command;

    if let Ok(cuda_path) = env::var("CUDA_PATH") {
        for name in ["nvcc", "nvcc.exe"] {
            let nvcc = PathBuf::from(&cuda_path).join("bin").join(name);
            if nvcc.exists() {
                return Some(nvcc.to_string_lossy().to_string());
            }
        }
    }

    let common_paths = [
        "/usr/local/cuda/bin/nvcc",
        "/usr/local/cuda-12/bin/nvcc",
        "/opt/cuda/bin/nvcc",
    ];
    for path in common_paths {
        if Path::new(path).exists() {
            return Some(path.to_string());
        }
    }

    if Command::new("nvcc").arg("--version").output().is_ok() {
        return Some("nvcc".to_string());
    }

    None
}
