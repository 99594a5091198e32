//! Pinhole Sensor

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::math::*;
use crate::paramset::*;
use crate::reflection::*;
use crate::spectrum::*;

/// An ideal pinhole camera. Its position is a single point and its importance
/// is distributed so that every raster position has equal weight.
#[derive(Clone, Debug)]
pub struct PinholeSensor {
    /// Camera position.
    eye: Point3f,

    /// Camera basis; the camera looks along `-vz`.
    vx: Vector3f,
    vy: Vector3f,
    vz: Vector3f,

    /// tan(fov / 2).
    tan_fov: Float,

    /// Width / height of the film.
    aspect: Float,
}

impl PinholeSensor {
    /// Create a new `PinholeSensor`.
    ///
    /// * `eye`    - Camera position.
    /// * `center` - Point the camera looks at.
    /// * `up`     - Up vector.
    /// * `fov`    - Vertical field of view in degrees.
    /// * `aspect` - Film width / height.
    pub fn new(
        eye: Point3f,
        center: Point3f,
        up: Vector3f,
        fov: Float,
        aspect: Float,
    ) -> Result<Self, String> {
        if !(fov > 0.0 && fov < 180.0) {
            return Err(format!("Invalid field of view {}", fov));
        }
        if !(aspect > 0.0 && aspect.is_finite()) {
            return Err(format!("Invalid aspect ratio {}", aspect));
        }
        let view = eye - center;
        if view.length_squared() == 0.0 {
            return Err(String::from("Camera position and target coincide"));
        }
        let vz = view.normalize();
        let vx = up.cross(&vz);
        if vx.length_squared() == 0.0 {
            return Err(format!("Up vector {} is parallel to the view direction", up));
        }
        let vx = vx.normalize();
        let vy = vz.cross(&vx);

        Ok(Self {
            eye,
            vx,
            vy,
            vz,
            tan_fov: (fov.to_radians() * 0.5).tan(),
            aspect,
        })
    }

    /// Returns the direction through a raster position.
    ///
    /// * `raster` - Raster position in `[0, 1]²`.
    pub fn direction(&self, raster: &Point2f) -> Vector3f {
        let r = 2.0 * *raster - Point2f::new(1.0, 1.0);
        let wo_eye = Vector3f::new(self.aspect * self.tan_fov * r.x, self.tan_fov * r.y, -1.0).normalize();
        self.vx * wo_eye.x + self.vy * wo_eye.y + self.vz * wo_eye.z
    }

    /// Returns the importance, equal to the projected solid angle density of
    /// directions through a uniformly chosen raster position.
    ///
    /// * `wo` - Outgoing direction.
    fn importance(&self, wo: &Vector3f) -> Float {
        if self.raster_position(wo, &SurfaceGeometry::degenerated(self.eye)).is_none() {
            return 0.0;
        }
        let cos_theta = -wo.dot(&self.vz);
        let inv_cos = 1.0 / cos_theta;
        let a = self.tan_fov * self.tan_fov * self.aspect * 4.0;
        inv_cos * inv_cos * inv_cos / a
    }
}

impl Bsdf for PinholeSensor {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::E
    }

    /// `u` is used as the raster position.
    fn sample_direction(
        &self,
        u: &Point2f,
        _u_comp: Float,
        query_type: SurfaceInteractionType,
        _geom: &SurfaceGeometry,
        _wi: &Vector3f,
    ) -> Option<Vector3f> {
        if !query_type.contains(SurfaceInteractionType::E) {
            return None;
        }
        Some(self.direction(u))
    }

    fn evaluate_direction_pdf(
        &self,
        _geom: &SurfaceGeometry,
        query_type: SurfaceInteractionType,
        _wi: &Vector3f,
        wo: &Vector3f,
        _eval_delta: bool,
    ) -> Float {
        if !query_type.contains(SurfaceInteractionType::E) {
            return 0.0;
        }
        self.importance(wo)
    }

    fn evaluate_direction(
        &self,
        _geom: &SurfaceGeometry,
        types: SurfaceInteractionType,
        _wi: &Vector3f,
        wo: &Vector3f,
        _trans_dir: TransportDirection,
        _eval_delta: bool,
    ) -> Spectrum {
        if !types.contains(SurfaceInteractionType::E) {
            return Spectrum::ZERO;
        }
        Spectrum::new(self.importance(wo))
    }
}

impl Emitter for PinholeSensor {
    fn sample_position(&self, _u: &Point2f) -> SurfaceGeometry {
        SurfaceGeometry::degenerated(self.eye)
    }

    fn evaluate_position_pdf(&self, _geom: &SurfaceGeometry, eval_delta: bool) -> Float {
        if eval_delta {
            0.0
        } else {
            1.0
        }
    }

    fn evaluate_position(&self, _geom: &SurfaceGeometry, eval_delta: bool) -> Spectrum {
        if eval_delta {
            Spectrum::ZERO
        } else {
            Spectrum::ONE
        }
    }

    /// The position sample is used as the raster position of the direction.
    fn sample_position_and_direction(
        &self,
        u_pos: &Point2f,
        _u_dir: &Point2f,
    ) -> Option<(SurfaceGeometry, Vector3f)> {
        Some((SurfaceGeometry::degenerated(self.eye), self.direction(u_pos)))
    }

    fn raster_position(&self, wo: &Vector3f, _geom: &SurfaceGeometry) -> Option<Point2f> {
        let wo_eye = Vector3f::new(wo.dot(&self.vx), wo.dot(&self.vy), wo.dot(&self.vz));
        if wo_eye.z >= 0.0 {
            return None;
        }
        let raster = Point2f::new(
            (-wo_eye.x / wo_eye.z / self.tan_fov / self.aspect + 1.0) * 0.5,
            (-wo_eye.y / wo_eye.z / self.tan_fov + 1.0) * 0.5,
        );
        if raster.in_unit_square() {
            Some(raster)
        } else {
            None
        }
    }
}

/// Create a pinhole sensor from parameters `eye`, `center`, `up`, `fov`,
/// `width` and `height`.
///
/// * `params` - Parameter set.
pub fn create_pinhole_sensor(params: &ParamSet) -> Result<Box<dyn Emitter>, String> {
    let eye = params.find_one_point3f("eye", Point3f::new(0.0, 0.0, 1.0));
    let center = params.find_one_point3f("center", Point3f::zero());
    let up = params.find_one_point3f("up", Vector3f::new(0.0, 1.0, 0.0));
    let fov = params.find_one_number("fov", 45.0);
    let width = params.find_one_int("width", 1280);
    let height = params.find_one_int("height", 720);
    if width <= 0 || height <= 0 {
        return Err(format!("Invalid film resolution {}x{}", width, height));
    }
    let aspect = width as Float / height as Float;
    Ok(Box::new(PinholeSensor::new(eye, center, up, fov, aspect)?))
}
