//! Engine configuration
//!
//! Configuration is loaded from environment variables; every knob has a
//! default matching the reference deployment.

use std::env;
use std::time::Duration;

use crate::downsample::Factor;
use crate::parallel::DEFAULT_MIN_CHUNK;
use crate::store::CuboidCacheConfig;

/// Main engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Cuboid shape `[z, y, x]` for every channel at every resolution
    pub cuboid_dims: [usize; 3],

    /// Pyramid configuration
    pub pyramid: PyramidConfig,

    /// Cuboid payload cache configuration
    pub cache: CacheConfig,

    /// Kernel parallelism configuration
    pub parallel: ParallelConfig,
}

/// Downsample pyramid configuration
#[derive(Debug, Clone)]
pub struct PyramidConfig {
    /// Reduction factor between adjacent levels, fixed per deployment
    pub factor: Factor,
    /// Highest resolution level built above native
    pub max_level: u32,
}

/// Cuboid cache sizing
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum cache size in bytes
    pub max_size_bytes: u64,
    /// Entry time-to-live in seconds
    pub ttl_secs: u64,
    /// Entry time-to-idle in seconds
    pub tti_secs: u64,
}

/// Parallel kernel tuning
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Minimum voxels per work unit handed to the rayon pool
    pub min_chunk: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // 16 Z slices of 512x512
            cuboid_dims: [16, 512, 512],
            pyramid: PyramidConfig::default(),
            cache: CacheConfig::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            factor: Factor::Anisotropic,
            max_level: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 512 * 1024 * 1024, // 512 MB
            ttl_secs: 3600,
            tti_secs: 1800,
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            min_chunk: DEFAULT_MIN_CHUNK,
        }
    }
}

impl CacheConfig {
    /// Convert to the moka-facing cache configuration
    pub fn to_cuboid_cache_config(&self) -> CuboidCacheConfig {
        CuboidCacheConfig {
            max_size_bytes: self.max_size_bytes,
            ttl: Duration::from_secs(self.ttl_secs),
            tti: Duration::from_secs(self.tti_secs),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = env::var("CUBOID_DIM_Z")
            && let Ok(z) = val.parse()
        {
            config.cuboid_dims[0] = z;
        }
        if let Ok(val) = env::var("CUBOID_DIM_Y")
            && let Ok(y) = val.parse()
        {
            config.cuboid_dims[1] = y;
        }
        if let Ok(val) = env::var("CUBOID_DIM_X")
            && let Ok(x) = val.parse()
        {
            config.cuboid_dims[2] = x;
        }

        if let Ok(val) = env::var("PYRAMID_HIERARCHY") {
            match val.to_lowercase().as_str() {
                "isotropic" => config.pyramid.factor = Factor::Isotropic,
                "anisotropic" => config.pyramid.factor = Factor::Anisotropic,
                _ => {}
            }
        }
        if let Ok(val) = env::var("PYRAMID_MAX_LEVEL")
            && let Ok(level) = val.parse()
        {
            config.pyramid.max_level = level;
        }

        if let Ok(val) = env::var("CUBOID_CACHE_MAX_MB")
            && let Ok(mb) = val.parse::<u64>()
        {
            config.cache.max_size_bytes = mb * 1024 * 1024;
        }
        if let Ok(val) = env::var("CUBOID_CACHE_TTL_SECS")
            && let Ok(secs) = val.parse()
        {
            config.cache.ttl_secs = secs;
        }
        if let Ok(val) = env::var("CUBOID_CACHE_TTI_SECS")
            && let Ok(secs) = val.parse()
        {
            config.cache.tti_secs = secs;
        }

        if let Ok(val) = env::var("KERNEL_MIN_CHUNK")
            && let Ok(chunk) = val.parse()
        {
            config.parallel.min_chunk = chunk;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cuboid_dims, [16, 512, 512]);
        assert_eq!(config.pyramid.factor, Factor::Anisotropic);
        assert_eq!(config.parallel.min_chunk, DEFAULT_MIN_CHUNK);
    }

    #[test]
    fn test_config_from_env() {
        // No env vars set by this test; defaults come back
        let config = Config::from_env();
        assert_eq!(config.cuboid_dims, [16, 512, 512]);
    }

    #[test]
    fn test_cache_config_conversion() {
        let cache = CacheConfig::default().to_cuboid_cache_config();
        assert_eq!(cache.ttl, Duration::from_secs(3600));
        assert_eq!(cache.max_size_bytes, 512 * 1024 * 1024);
    }
}
